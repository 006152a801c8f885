use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::config::{TimerConfig, TimerMode};
use crate::time_math::format_time;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    Completed,
}

/// Mutable timing state of the single session. Only the engine writes it.
#[derive(Debug, Clone, PartialEq)]
pub struct TimerSession {
    pub(crate) state: TimerState,
    /// Wall-clock instant the current run-segment is measured from, already
    /// shifted back by the time accumulated before the last pause.
    pub(crate) anchor: Option<DateTime<Utc>>,
    pub(crate) paused_elapsed: Duration,
    /// Remaining seconds (countdown) or elapsed seconds (countup).
    pub(crate) model_seconds: u64,
    /// Last whole second that produced a final-countdown cue; -1 for none.
    pub(crate) last_beep_second: i64,
}

impl TimerSession {
    pub(crate) fn new(config: &TimerConfig) -> Self {
        Self {
            state: TimerState::Idle,
            anchor: None,
            paused_elapsed: Duration::zero(),
            model_seconds: config.initial_model_seconds(),
            last_beep_second: -1,
        }
    }

    /// Clear everything a fresh run starts without.
    pub(crate) fn rewind(&mut self, config: &TimerConfig) {
        self.anchor = None;
        self.paused_elapsed = Duration::zero();
        self.model_seconds = config.initial_model_seconds();
        self.last_beep_second = -1;
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn anchor(&self) -> Option<DateTime<Utc>> {
        self.anchor
    }

    pub fn paused_elapsed(&self) -> Duration {
        self.paused_elapsed
    }

    pub fn model_seconds(&self) -> u64 {
        self.model_seconds
    }

    pub fn last_beep_second(&self) -> i64 {
        self.last_beep_second
    }
}

/// Renderable view of the session, produced on every tick and on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub state: TimerState,
    pub mode: TimerMode,
    pub model_seconds: u64,
    pub target_seconds: u64,
    /// 0.0 .. 1.0
    pub progress: f64,
    pub display: String,
}

impl Snapshot {
    pub(crate) fn of(session: &TimerSession, config: &TimerConfig) -> Self {
        Self {
            state: session.state,
            mode: config.mode,
            model_seconds: session.model_seconds,
            target_seconds: config.target_seconds,
            progress: config.progress(session.model_seconds),
            display: format_time(session.model_seconds),
        }
    }
}
