//! Append-only log of finished sessions.
//!
//! Stored in creation order; presented most recent first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::time_math::format_time;
use crate::timer::TimerMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Completed,
    Stopped,
}

impl Outcome {
    pub fn label(self) -> &'static str {
        match self {
            Outcome::Completed => "completed",
            Outcome::Stopped => "stopped",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub mode: TimerMode,
    pub configured_seconds: u64,
    /// Model time when the session ended: remaining for countdown, elapsed
    /// for countup.
    pub final_seconds: u64,
    pub outcome: Outcome,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    /// One-line summary, e.g. `Countdown 25:00 completed`.
    pub fn label(&self) -> String {
        let shown = match self.mode {
            TimerMode::Countdown => self.configured_seconds,
            TimerMode::Countup => self.final_seconds,
        };
        format!(
            "{} {} {}",
            self.mode.label(),
            format_time(shown),
            self.outcome.label()
        )
    }

    /// Actual time spent, regardless of mode.
    pub fn elapsed_seconds(&self) -> u64 {
        match self.mode {
            TimerMode::Countdown => self.configured_seconds.saturating_sub(self.final_seconds),
            TimerMode::Countup => self.final_seconds,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<HistoryEntry>) -> Self {
        Self { entries }
    }

    pub fn append(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    /// Lazy newest-first view. Cloning the iterator restarts nothing in the
    /// log itself; call again for a fresh pass.
    pub fn recent_first(&self) -> std::iter::Rev<std::slice::Iter<'_, HistoryEntry>> {
        self.entries.iter().rev()
    }

    /// Entries in creation order.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn entry(configured: u64, outcome: Outcome, at: DateTime<Utc>) -> HistoryEntry {
        HistoryEntry {
            mode: TimerMode::Countdown,
            configured_seconds: configured,
            final_seconds: 0,
            outcome,
            timestamp: at,
        }
    }

    #[test]
    fn recent_first_reverses_without_reordering_storage() {
        let base = Utc::now();
        let mut log = HistoryLog::new();
        log.append(entry(60, Outcome::Completed, base));
        log.append(entry(120, Outcome::Stopped, base + Duration::minutes(5)));
        log.append(entry(180, Outcome::Completed, base + Duration::minutes(10)));

        let recent: Vec<u64> = log.recent_first().map(|e| e.configured_seconds).collect();
        assert_eq!(recent, vec![180, 120, 60]);

        // a second pass sees the same thing
        assert_eq!(log.recent_first().count(), 3);
        assert_eq!(log.entries()[0].configured_seconds, 60);
    }

    #[test]
    fn clear_empties_the_log() {
        let mut log = HistoryLog::new();
        log.append(entry(60, Outcome::Completed, Utc::now()));
        log.clear();
        assert!(log.is_empty());
        assert_eq!(log.recent_first().next(), None);
    }

    #[test]
    fn labels_follow_mode() {
        let at = Utc::now();
        assert_eq!(
            entry(1500, Outcome::Completed, at).label(),
            "Countdown 25:00 completed"
        );

        let up = HistoryEntry {
            mode: TimerMode::Countup,
            configured_seconds: 0,
            final_seconds: 754,
            outcome: Outcome::Stopped,
            timestamp: at,
        };
        assert_eq!(up.label(), "Countup 12:34 stopped");
        assert_eq!(up.elapsed_seconds(), 754);
    }

    #[test]
    fn stopped_countdown_reports_time_spent() {
        let e = HistoryEntry {
            mode: TimerMode::Countdown,
            configured_seconds: 600,
            final_seconds: 420,
            outcome: Outcome::Stopped,
            timestamp: Utc::now(),
        };
        assert_eq!(e.elapsed_seconds(), 180);
    }
}
