//! Timer engine implementation.
//!
//! The timer engine is a wall-clock-based state machine. It does not use
//! internal threads - the caller is responsible for calling `tick()` about
//! once per second while the timer is running.
//!
//! Model time is recomputed from the anchor instant on every tick rather than
//! decremented, so a late or throttled driver never makes the timer drift.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!           |            |
//!           v            v
//!       Completed      (reset) -> Idle
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::open(SystemClock, store, &catalog, output);
//! engine.start();
//! // Once per second:
//! if let Some(report) = engine.tick() { render(&report.snapshot); }
//! ```

use chrono::{DateTime, Duration, Utc};

use super::clock::{Clock, SystemClock};
use super::config::{TimerConfig, TimerMode};
use super::preset::{Preset, PresetList};
use super::reminders::{Reminder, ReminderId, ReminderSet};
use super::session::{Snapshot, TimerSession, TimerState};
use crate::audio::{AudioCueBroker, CueCatalog, CueOutput, DecodedCue};
use crate::error::{AudioError, ValidationError};
use crate::events::Event;
use crate::history::{HistoryEntry, HistoryLog, Outcome};
use crate::storage::{PreferenceStore, Preferences};

/// Countdown seconds that each get a short cue.
pub const FINAL_COUNTDOWN_SECS: u64 = 10;

/// How long the completion cue may ring before it is cut off.
pub const COMPLETION_CUE_SECS: i64 = 5;

type Listener = Box<dyn FnMut(&Event) + Send>;

/// What one tick did.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub snapshot: Snapshot,
    /// Reminders delivered by this tick.
    pub fired: Vec<Reminder>,
    /// This tick finished the run.
    pub completed: bool,
}

/// Core timer engine.
///
/// Single writer of the [`TimerSession`]; everything else sees snapshots.
pub struct TimerEngine<C: Clock = SystemClock> {
    clock: C,
    config: TimerConfig,
    session: TimerSession,
    reminders: ReminderSet,
    presets: PresetList,
    history: HistoryLog,
    audio: AudioCueBroker,
    store: Box<dyn PreferenceStore + Send>,
    listeners: Vec<Listener>,
}

impl<C: Clock> TimerEngine<C> {
    /// Build an engine from already-loaded preferences.
    pub fn new(
        clock: C,
        prefs: Preferences,
        audio: AudioCueBroker,
        store: Box<dyn PreferenceStore + Send>,
    ) -> Self {
        let config = if prefs.timer.is_startable() {
            prefs.timer
        } else {
            tracing::warn!("stored countdown has no duration; using the default");
            prefs.timer.with_mode(prefs.timer.mode)
        };
        let reminders = ReminderSet::from_drafts(&prefs.reminders, &config);

        Self {
            clock,
            config,
            session: TimerSession::new(&config),
            reminders,
            presets: prefs.presets,
            history: HistoryLog::from_entries(prefs.history),
            audio,
            store,
            listeners: Vec::new(),
        }
    }

    /// Load preferences from `store` (defaults if it is unavailable) and wire
    /// up an audio broker for `catalog`. Cues start undecoded; feed them in
    /// with [`install_cue`](Self::install_cue).
    pub fn open(
        clock: C,
        store: Box<dyn PreferenceStore + Send>,
        catalog: &CueCatalog,
        output: Box<dyn CueOutput + Send>,
    ) -> Self {
        let prefs = store.load().unwrap_or_else(|e| {
            tracing::warn!("preferences unavailable, using defaults: {e}");
            Preferences::default()
        });
        let audio = AudioCueBroker::new(catalog, prefs.audio.clone(), output);
        Self::new(clock, prefs, audio, store)
    }

    /// Register a callback for every emitted [`Event`].
    pub fn subscribe(&mut self, listener: impl FnMut(&Event) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.session.state
    }

    pub fn session(&self) -> &TimerSession {
        &self.session
    }

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    pub fn model_seconds(&self) -> u64 {
        self.session.model_seconds
    }

    pub fn progress(&self) -> f64 {
        self.config.progress(self.session.model_seconds)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::of(&self.session, &self.config)
    }

    pub fn reminders(&self) -> &ReminderSet {
        &self.reminders
    }

    pub fn presets(&self) -> &PresetList {
        &self.presets
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn audio(&self) -> &AudioCueBroker {
        &self.audio
    }

    /// Direct cue control (test sounds, manual stop). Selection changes made
    /// here are not persisted; use the engine's audio setters for that.
    pub fn audio_mut(&mut self) -> &mut AudioCueBroker {
        &mut self.audio
    }

    pub fn preferences(&self) -> Preferences {
        Preferences {
            timer: self.config,
            audio: self.audio.selection().clone(),
            presets: self.presets.clone(),
            reminders: self.reminders.drafts(),
            history: self.history.entries().to_vec(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a fresh run from idle/completed, or resume a paused one.
    pub fn start(&mut self) -> Option<Event> {
        match self.session.state {
            TimerState::Running => {
                tracing::debug!("start ignored: already running");
                None
            }
            TimerState::Paused => self.resume(),
            TimerState::Idle | TimerState::Completed => {
                if let Err(e) = self.config.validate() {
                    tracing::debug!("start rejected: {e}");
                    return None;
                }
                // the previous run's completion cue and its auto-stop end here
                self.audio.stop_all();
                self.session.rewind(&self.config);
                self.reminders.unfire_all();
                let at = self.begin_segment();
                tracing::info!(
                    mode = ?self.config.mode,
                    target = self.config.target_seconds,
                    "timer started"
                );
                Some(self.emit(Event::TimerStarted {
                    mode: self.config.mode,
                    target_seconds: self.config.target_seconds,
                    at,
                }))
            }
        }
    }

    /// Continue a paused run. Fired reminders and the cue marker are kept.
    pub fn resume(&mut self) -> Option<Event> {
        if self.session.state != TimerState::Paused {
            tracing::debug!(state = ?self.session.state, "resume ignored");
            return None;
        }
        let at = self.begin_segment();
        tracing::info!(model_seconds = self.session.model_seconds, "timer resumed");
        Some(self.emit(Event::TimerResumed {
            model_seconds: self.session.model_seconds,
            at,
        }))
    }

    pub fn pause(&mut self) -> Option<Event> {
        if self.session.state != TimerState::Running {
            tracing::debug!(state = ?self.session.state, "pause ignored");
            return None;
        }
        let now = self.clock.now();
        let anchor = self.session.anchor.unwrap_or(now);
        self.session.paused_elapsed = now - anchor;
        self.session.state = TimerState::Paused;
        tracing::info!(model_seconds = self.session.model_seconds, "timer paused");
        Some(self.emit(Event::TimerPaused {
            model_seconds: self.session.model_seconds,
            at: now,
        }))
    }

    /// Pause when running, otherwise start or resume.
    pub fn toggle(&mut self) -> Option<Event> {
        if self.session.state == TimerState::Running {
            self.pause()
        } else {
            self.start()
        }
    }

    pub fn reset(&mut self) -> Option<Event> {
        self.reset_with_outcome(None)
    }

    /// Return to idle, first recording `outcome` to history if given.
    /// Whether an outcome applies is the caller's decision.
    pub fn reset_with_outcome(&mut self, outcome: Option<Outcome>) -> Option<Event> {
        if let Some(outcome) = outcome {
            self.record(outcome);
        }
        self.session.state = TimerState::Idle;
        self.session.rewind(&self.config);
        self.reminders.unfire_all();
        self.audio.stop_all();
        tracing::info!(?outcome, "timer reset");
        let at = self.clock.now();
        Some(self.emit(Event::TimerReset { outcome, at }))
    }

    /// Reset, recording the session as stopped if it was running or paused.
    pub fn abandon(&mut self) -> Option<Event> {
        let outcome = matches!(
            self.session.state,
            TimerState::Running | TimerState::Paused
        )
        .then_some(Outcome::Stopped);
        self.reset_with_outcome(outcome)
    }

    /// Recompute model time from the wall clock and run the per-second side
    /// effects: completion, reminders, final-countdown cues.
    ///
    /// Returns `None` unless the timer is running.
    pub fn tick(&mut self) -> Option<TickReport> {
        if self.session.state != TimerState::Running {
            tracing::debug!(state = ?self.session.state, "tick ignored");
            return None;
        }

        let now = self.clock.now();
        let anchor = self.session.anchor.unwrap_or(now);
        let elapsed = ((now - anchor).num_milliseconds().max(0) / 1000) as u64;
        let target = self.config.target_seconds;

        match self.config.mode {
            TimerMode::Countdown => {
                if elapsed >= target {
                    self.session.model_seconds = 0;
                    return Some(self.complete(now));
                }
                self.session.model_seconds = target - elapsed;
            }
            TimerMode::Countup => {
                self.session.model_seconds = elapsed;
                if target > 0 && elapsed >= target {
                    self.session.model_seconds = target;
                    return Some(self.complete(now));
                }
            }
        }

        let fired = self.reminders.due_at(self.session.model_seconds as f64);
        for reminder in &fired {
            tracing::debug!(at_seconds = reminder.at_seconds(), "reminder fired");
            self.audio.play_short();
            self.emit(Event::ReminderFired {
                reminder_id: reminder.id(),
                at_seconds: reminder.at_seconds(),
                message: reminder.text().to_string(),
                at: now,
            });
        }

        self.final_countdown_cue();

        let snapshot = self.snapshot();
        self.emit(Event::Tick {
            snapshot: snapshot.clone(),
            at: now,
        });
        Some(TickReport {
            snapshot,
            fired,
            completed: false,
        })
    }

    /// Apply a pending post-completion auto-stop. Call periodically after a
    /// run completes. Returns true if cues were stopped.
    pub fn poll_audio(&mut self) -> bool {
        let now = self.clock.now();
        self.audio.expire(now)
    }

    /// True while a cue is still audible.
    pub fn audio_busy(&mut self) -> bool {
        self.audio.is_busy()
    }

    pub fn install_cue(&mut self, id: &str, result: Result<DecodedCue, AudioError>) {
        self.audio.install(id, result);
    }

    // ── Configuration ────────────────────────────────────────────────

    /// Replace the configuration and return to idle.
    ///
    /// # Errors
    /// Rejects an unstartable configuration, and a countdown shorter than an
    /// existing reminder; nothing changes in either case.
    pub fn apply_config(&mut self, config: TimerConfig) -> Result<(), ValidationError> {
        config.validate()?;
        self.reminders.fits(&config)?;
        self.config = config;
        self.reset_with_outcome(None);
        self.persist();
        Ok(())
    }

    pub fn set_mode(&mut self, mode: TimerMode) -> Result<(), ValidationError> {
        self.apply_config(self.config.with_mode(mode))
    }

    pub fn set_target(&mut self, target_seconds: u64) -> Result<(), ValidationError> {
        self.apply_config(TimerConfig {
            target_seconds,
            ..self.config
        })
    }

    /// Switch to a countdown of the preset's duration.
    pub fn apply_preset(&mut self, index: usize) -> Result<(), ValidationError> {
        let seconds = self.presets.get(index)?.total_seconds();
        self.apply_config(TimerConfig::countdown(seconds))
    }

    pub fn add_preset(&mut self, preset: Preset) -> usize {
        let index = self.presets.add(preset);
        self.persist();
        index
    }

    pub fn update_preset(&mut self, index: usize, preset: Preset) -> Result<(), ValidationError> {
        self.presets.update(index, preset)?;
        self.persist();
        Ok(())
    }

    pub fn remove_preset(&mut self, index: usize) -> Result<Preset, ValidationError> {
        let removed = self.presets.remove(index)?;
        self.persist();
        Ok(removed)
    }

    pub fn add_reminder(
        &mut self,
        at_seconds: i64,
        message: Option<String>,
    ) -> Result<ReminderId, ValidationError> {
        let id = self.reminders.add(at_seconds, message, &self.config)?;
        self.persist();
        Ok(id)
    }

    /// Edit a reminder; it is re-armed even mid-run.
    pub fn update_reminder(
        &mut self,
        id: ReminderId,
        at_seconds: Option<i64>,
        message: Option<String>,
    ) -> Result<(), ValidationError> {
        self.reminders
            .update(id, at_seconds, message, &self.config)?;
        self.persist();
        Ok(())
    }

    pub fn remove_reminder(&mut self, id: ReminderId) -> Result<Reminder, ValidationError> {
        let removed = self.reminders.remove(id)?;
        self.persist();
        Ok(removed)
    }

    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.audio.set_enabled(enabled);
        self.persist();
    }

    pub fn set_volume(&mut self, volume: f64) {
        self.audio.set_volume(volume);
        self.persist();
    }

    pub fn select_cues(&mut self, short_cue_id: &str, long_cue_id: &str) -> Result<(), AudioError> {
        self.audio.select(short_cue_id, long_cue_id)?;
        self.persist();
        Ok(())
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.persist();
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn begin_segment(&mut self) -> DateTime<Utc> {
        let now = self.clock.now();
        self.session.anchor = Some(now - self.session.paused_elapsed);
        self.session.state = TimerState::Running;
        now
    }

    fn complete(&mut self, now: DateTime<Utc>) -> TickReport {
        self.session.state = TimerState::Completed;
        self.record(Outcome::Completed);
        self.audio.play_long();
        self.audio
            .stop_all_after(now + Duration::seconds(COMPLETION_CUE_SECS));
        tracing::info!(
            mode = ?self.config.mode,
            final_seconds = self.session.model_seconds,
            "timer completed"
        );
        self.emit(Event::TimerCompleted {
            mode: self.config.mode,
            configured_seconds: self.config.target_seconds,
            final_seconds: self.session.model_seconds,
            at: now,
        });
        TickReport {
            snapshot: self.snapshot(),
            fired: Vec::new(),
            completed: true,
        }
    }

    fn final_countdown_cue(&mut self) {
        if self.config.mode != TimerMode::Countdown {
            return;
        }
        let model = self.session.model_seconds;
        if model == 0 || model > FINAL_COUNTDOWN_SECS {
            return;
        }
        let second = model as i64;
        if second != self.session.last_beep_second {
            self.audio.play_short();
            self.session.last_beep_second = second;
        }
    }

    fn record(&mut self, outcome: Outcome) {
        self.history.append(HistoryEntry {
            mode: self.config.mode,
            configured_seconds: self.config.target_seconds,
            final_seconds: self.session.model_seconds,
            outcome,
            timestamp: self.clock.now(),
        });
        self.persist();
    }

    /// Best-effort save; the in-memory change stands either way.
    fn persist(&self) {
        if let Err(e) = self.store.save(&self.preferences()) {
            tracing::warn!("failed to save preferences: {e}");
        }
    }

    fn emit(&mut self, event: Event) -> Event {
        for listener in &mut self.listeners {
            listener(&event);
        }
        event
    }
}
