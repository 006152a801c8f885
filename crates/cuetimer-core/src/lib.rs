//! # cuetimer Core Library
//!
//! Core logic for a single-session interval timer: countdown or count-up,
//! mid-session reminders, audible cues and a persisted history. The CLI is a
//! thin driver over this crate.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A wall-clock-based state machine that requires the caller
//!   to invoke `tick()` about once per second while running
//! - **Reminders**: At-most-once triggers keyed on model time
//! - **Audio**: Cue catalog decoding and short/long cue arbitration
//! - **Storage**: TOML preferences (config, presets, reminders, history)
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`ReminderSet`]: Reminder definitions and firing
//! - [`AudioCueBroker`]: Cue playback arbitration
//! - [`HistoryLog`]: Finished sessions
//! - [`PreferenceStore`]: Load/save contract for preferences

pub mod audio;
pub mod error;
pub mod events;
pub mod history;
pub mod storage;
pub mod time_math;
pub mod timer;

pub use audio::{AudioCueBroker, AudioCueSelection, CueCatalog, CueKind, CueOutput};
pub use error::{AudioError, ConfigError, CoreError, ValidationError};
pub use events::Event;
pub use history::{HistoryEntry, HistoryLog, Outcome};
pub use storage::{FileStore, MemoryStore, PreferenceStore, Preferences};
pub use time_math::{format_time, hms_to_seconds, parse_time, seconds_to_hms, Hms};
pub use timer::{
    Clock, ManualClock, Preset, PresetList, Reminder, ReminderId, ReminderSet, Snapshot,
    SystemClock, TickReport, TimerConfig, TimerEngine, TimerMode, TimerState,
};
