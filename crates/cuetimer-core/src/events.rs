use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::history::Outcome;
use crate::timer::{ReminderId, Snapshot, TimerMode};

/// Every state change of the engine produces an Event.
/// Subscribers get one per transition, one per fired reminder and one per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// Fresh run from idle or completed.
    TimerStarted {
        mode: TimerMode,
        target_seconds: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        model_seconds: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        model_seconds: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        /// Outcome recorded to history on the way out, if any.
        outcome: Option<Outcome>,
        at: DateTime<Utc>,
    },
    TimerCompleted {
        mode: TimerMode,
        configured_seconds: u64,
        final_seconds: u64,
        at: DateTime<Utc>,
    },
    ReminderFired {
        reminder_id: ReminderId,
        at_seconds: u64,
        message: String,
        at: DateTime<Utc>,
    },
    Tick {
        snapshot: Snapshot,
        at: DateTime<Utc>,
    },
}
