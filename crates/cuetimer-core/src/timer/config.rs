use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Target used when nothing else is configured, and when switching to
/// countdown with an empty target.
pub const DEFAULT_TARGET_SECONDS: u64 = 25 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    /// Model time is the remaining time; runs down to zero.
    #[default]
    Countdown,
    /// Model time is the elapsed time; runs up to an optional ceiling.
    Countup,
}

impl TimerMode {
    pub fn label(self) -> &'static str {
        match self {
            TimerMode::Countdown => "Countdown",
            TimerMode::Countup => "Countup",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default)]
    pub mode: TimerMode,
    /// Full duration for countdown, ceiling for countup (0 = no ceiling).
    #[serde(default = "default_target_seconds")]
    pub target_seconds: u64,
}

fn default_target_seconds() -> u64 {
    DEFAULT_TARGET_SECONDS
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            mode: TimerMode::Countdown,
            target_seconds: DEFAULT_TARGET_SECONDS,
        }
    }
}

impl TimerConfig {
    pub fn countdown(target_seconds: u64) -> Self {
        Self {
            mode: TimerMode::Countdown,
            target_seconds,
        }
    }

    pub fn countup(target_seconds: u64) -> Self {
        Self {
            mode: TimerMode::Countup,
            target_seconds,
        }
    }

    /// Switch mode, substituting the default target when a countdown would
    /// otherwise have nothing to count.
    pub fn with_mode(self, mode: TimerMode) -> Self {
        let target_seconds = if mode == TimerMode::Countdown && self.target_seconds == 0 {
            DEFAULT_TARGET_SECONDS
        } else {
            self.target_seconds
        };
        Self {
            mode,
            target_seconds,
        }
    }

    /// # Errors
    /// Rejects a countdown with a zero target.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.mode == TimerMode::Countdown && self.target_seconds == 0 {
            return Err(ValidationError::NonPositiveCountdownTarget);
        }
        Ok(())
    }

    pub fn is_startable(&self) -> bool {
        self.validate().is_ok()
    }

    /// Model time at the beginning of a fresh run.
    pub fn initial_model_seconds(&self) -> u64 {
        match self.mode {
            TimerMode::Countdown => self.target_seconds,
            TimerMode::Countup => 0,
        }
    }

    /// 0.0 .. 1.0 progress for the given model time.
    pub fn progress(&self, model_seconds: u64) -> f64 {
        if self.target_seconds == 0 {
            return 0.0;
        }
        let target = self.target_seconds as f64;
        let model = model_seconds as f64;
        match self.mode {
            TimerMode::Countdown => ((target - model) / target).clamp(0.0, 1.0),
            TimerMode::Countup => (model / target).min(1.0),
        }
    }
}
