mod clock;
mod config;
mod engine;
mod preset;
mod reminders;
mod session;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{TimerConfig, TimerMode, DEFAULT_TARGET_SECONDS};
pub use engine::{TickReport, TimerEngine, COMPLETION_CUE_SECS, FINAL_COUNTDOWN_SECS};
pub use preset::{Preset, PresetList};
pub use reminders::{Reminder, ReminderDraft, ReminderId, ReminderSet};
pub use session::{Snapshot, TimerSession, TimerState};
