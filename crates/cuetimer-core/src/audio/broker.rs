//! Audio cue arbitration.
//!
//! At most one long cue is audible at a time; short cues overlap freely.
//! Nothing here ever fails the caller: missing or undecoded cues are logged,
//! remembered in [`AudioCueBroker::last_failure`], and skipped.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::{CueCatalog, DecodedCue, DEFAULT_LONG_CUE, DEFAULT_SHORT_CUE};
use super::output::{CueKind, CueOutput, PlaybackId};
use crate::error::AudioError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioCueSelection {
    #[serde(default = "default_short_cue")]
    pub short_cue_id: String,
    #[serde(default = "default_long_cue")]
    pub long_cue_id: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// 0.0 ..= 1.0
    #[serde(default = "default_volume")]
    pub volume: f64,
}

fn default_short_cue() -> String {
    DEFAULT_SHORT_CUE.into()
}
fn default_long_cue() -> String {
    DEFAULT_LONG_CUE.into()
}
fn default_true() -> bool {
    true
}
fn default_volume() -> f64 {
    0.7
}

impl Default for AudioCueSelection {
    fn default() -> Self {
        Self {
            short_cue_id: default_short_cue(),
            long_cue_id: default_long_cue(),
            enabled: true,
            volume: default_volume(),
        }
    }
}

pub fn clamp_volume(volume: f64) -> f64 {
    if volume.is_nan() {
        return 0.0;
    }
    volume.clamp(0.0, 1.0)
}

pub struct AudioCueBroker {
    selection: AudioCueSelection,
    known: HashSet<String>,
    decoded: HashMap<String, DecodedCue>,
    output: Box<dyn CueOutput + Send>,
    active: Vec<PlaybackId>,
    long: Option<PlaybackId>,
    stop_deadline: Option<DateTime<Utc>>,
    last_failure: Option<AudioError>,
}

impl std::fmt::Debug for AudioCueBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioCueBroker")
            .field("selection", &self.selection)
            .field("decoded", &self.decoded.keys().collect::<Vec<_>>())
            .field("active", &self.active)
            .field("long", &self.long)
            .finish()
    }
}

impl AudioCueBroker {
    pub fn new(
        catalog: &CueCatalog,
        mut selection: AudioCueSelection,
        output: Box<dyn CueOutput + Send>,
    ) -> Self {
        selection.volume = clamp_volume(selection.volume);
        Self {
            selection,
            known: catalog.ids().map(str::to_string).collect(),
            decoded: HashMap::new(),
            output,
            active: Vec::new(),
            long: None,
            stop_deadline: None,
            last_failure: None,
        }
    }

    /// Accept a decode result. Failures leave the cue unplayable.
    pub fn install(&mut self, id: &str, result: Result<DecodedCue, AudioError>) {
        match result {
            Ok(cue) => {
                tracing::debug!(cue = id, "cue decoded");
                self.decoded.insert(id.to_string(), cue);
            }
            Err(e) => {
                tracing::warn!("cue '{id}' unavailable: {e}");
                self.decoded.remove(id);
                self.last_failure = Some(e);
            }
        }
    }

    pub fn is_ready(&self, id: &str) -> bool {
        self.decoded.contains_key(id)
    }

    pub fn play_short(&mut self) -> Option<PlaybackId> {
        self.play(CueKind::Short)
    }

    /// Start the completion cue, silencing any previous one first.
    pub fn play_long(&mut self) -> Option<PlaybackId> {
        self.play(CueKind::Long)
    }

    /// Short cue now; the caller plays the long cue a moment later.
    pub fn test_cues(&mut self) -> Option<PlaybackId> {
        self.play_short()
    }

    fn play(&mut self, kind: CueKind) -> Option<PlaybackId> {
        if !self.selection.enabled {
            return None;
        }
        let cue_id = match kind {
            CueKind::Short => &self.selection.short_cue_id,
            CueKind::Long => &self.selection.long_cue_id,
        };
        let Some(cue) = self.decoded.get(cue_id) else {
            let err = if self.known.contains(cue_id) {
                AudioError::NotDecoded(cue_id.clone())
            } else {
                AudioError::UnknownCue(cue_id.clone())
            };
            tracing::warn!("skipping {kind:?} cue: {err}");
            self.last_failure = Some(err);
            return None;
        };

        if kind == CueKind::Long {
            if let Some(previous) = self.long.take() {
                self.output.stop(previous);
                self.active.retain(|id| *id != previous);
            }
        }

        match self.output.start(cue, kind, self.selection.volume) {
            Ok(id) => {
                self.prune();
                self.active.push(id);
                if kind == CueKind::Long {
                    self.long = Some(id);
                }
                Some(id)
            }
            Err(e) => {
                tracing::warn!("failed to play {kind:?} cue: {e}");
                self.last_failure = Some(e);
                None
            }
        }
    }

    /// Halt every cue that is still playing.
    pub fn stop_all(&mut self) {
        for id in self.active.drain(..) {
            self.output.stop(id);
        }
        self.long = None;
        self.stop_deadline = None;
    }

    /// Arrange for [`stop_all`](Self::stop_all) once `deadline` passes.
    pub fn stop_all_after(&mut self, deadline: DateTime<Utc>) {
        self.stop_deadline = Some(deadline);
    }

    /// Apply a pending auto-stop. Returns true if it fired.
    pub fn expire(&mut self, now: DateTime<Utc>) -> bool {
        match self.stop_deadline {
            Some(deadline) if now >= deadline => {
                self.stop_all();
                true
            }
            _ => false,
        }
    }

    /// True while any tracked cue is still audible. A pending auto-stop with
    /// nothing left to stop is dropped.
    pub fn is_busy(&mut self) -> bool {
        self.prune();
        if self.active.is_empty() {
            self.stop_deadline = None;
        }
        !self.active.is_empty()
    }

    fn prune(&mut self) {
        let output = &self.output;
        self.active.retain(|id| output.is_active(*id));
        if self.long.is_some_and(|id| !self.active.contains(&id)) {
            self.long = None;
        }
    }

    /// Affects cues started from now on.
    pub fn set_volume(&mut self, volume: f64) {
        self.selection.volume = clamp_volume(volume);
    }

    /// Gates future plays only; cues already playing continue.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.selection.enabled = enabled;
    }

    /// # Errors
    /// Rejects ids that are not in the catalog.
    pub fn select(&mut self, short_cue_id: &str, long_cue_id: &str) -> Result<(), AudioError> {
        for id in [short_cue_id, long_cue_id] {
            if !self.known.contains(id) {
                return Err(AudioError::UnknownCue(id.to_string()));
            }
        }
        self.selection.short_cue_id = short_cue_id.to_string();
        self.selection.long_cue_id = long_cue_id.to_string();
        Ok(())
    }

    pub fn selection(&self) -> &AudioCueSelection {
        &self.selection
    }

    pub fn last_failure(&self) -> Option<&AudioError> {
        self.last_failure.as_ref()
    }

    pub fn long_cue(&self) -> Option<PlaybackId> {
        self.long
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::output::MemoryOutput;
    use chrono::Duration;
    use std::path::Path;
    use std::sync::Arc;

    fn cue(id: &str) -> DecodedCue {
        DecodedCue {
            id: id.to_string(),
            samples: Arc::from(vec![0.0f32; 800]),
            sample_rate: 8000,
            channels: 1,
        }
    }

    fn ready_broker() -> (AudioCueBroker, MemoryOutput) {
        let output = MemoryOutput::new();
        let catalog = CueCatalog::builtin(Path::new("sounds"));
        let mut broker =
            AudioCueBroker::new(&catalog, AudioCueSelection::default(), Box::new(output.clone()));
        broker.install(DEFAULT_SHORT_CUE, Ok(cue(DEFAULT_SHORT_CUE)));
        broker.install(DEFAULT_LONG_CUE, Ok(cue(DEFAULT_LONG_CUE)));
        (broker, output)
    }

    #[test]
    fn short_cues_overlap() {
        let (mut broker, output) = ready_broker();
        broker.play_short().unwrap();
        broker.play_short().unwrap();
        assert_eq!(output.active().len(), 2);
    }

    #[test]
    fn second_long_cue_replaces_first() {
        let (mut broker, output) = ready_broker();
        let first = broker.play_long().unwrap();
        let second = broker.play_long().unwrap();

        let active = output.active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, second);
        assert_ne!(first, second);
        assert_eq!(broker.long_cue(), Some(second));
    }

    #[test]
    fn disabled_broker_is_silent_but_leaves_playing_cues() {
        let (mut broker, output) = ready_broker();
        broker.play_long().unwrap();
        broker.set_enabled(false);
        assert!(broker.play_short().is_none());
        assert_eq!(output.active().len(), 1);
    }

    #[test]
    fn undecoded_cue_is_reported_not_raised() {
        let output = MemoryOutput::new();
        let catalog = CueCatalog::builtin(Path::new("sounds"));
        let mut broker =
            AudioCueBroker::new(&catalog, AudioCueSelection::default(), Box::new(output.clone()));

        assert!(broker.play_short().is_none());
        assert_eq!(
            broker.last_failure(),
            Some(&AudioError::NotDecoded(DEFAULT_SHORT_CUE.into()))
        );

        broker.install(
            "gong",
            Err(AudioError::DecodeFailed {
                cue: "gong".into(),
                message: "bad header".into(),
            }),
        );
        assert!(!broker.is_ready("gong"));
        assert!(output.playbacks().is_empty());
    }

    #[test]
    fn output_failure_is_swallowed() {
        let (mut broker, output) = ready_broker();
        output.fail_next(AudioError::Output("device busy".into()));
        assert!(broker.play_short().is_none());
        assert!(broker.play_short().is_some());
    }

    #[test]
    fn volume_is_clamped_and_applies_to_new_cues() {
        let (mut broker, output) = ready_broker();
        broker.play_short();
        broker.set_volume(3.0);
        broker.play_short();
        broker.set_volume(-1.0);
        broker.play_short();

        let volumes: Vec<f64> = output.playbacks().iter().map(|p| p.volume).collect();
        assert_eq!(volumes, vec![0.7, 1.0, 0.0]);
    }

    #[test]
    fn stop_all_and_timed_expiry() {
        let (mut broker, output) = ready_broker();
        broker.play_short();
        broker.play_long();

        let now = Utc::now();
        broker.stop_all_after(now + Duration::seconds(5));
        assert!(!broker.expire(now + Duration::seconds(4)));
        assert_eq!(output.active().len(), 2);
        assert!(broker.is_busy());

        assert!(broker.expire(now + Duration::seconds(5)));
        assert!(output.active().is_empty());
        assert!(!broker.is_busy());
        assert_eq!(broker.long_cue(), None);
    }

    #[test]
    fn select_rejects_unknown_ids() {
        let (mut broker, _) = ready_broker();
        assert_eq!(
            broker.select("chime", "airhorn"),
            Err(AudioError::UnknownCue("airhorn".into()))
        );
        broker.select("ding", "gong").unwrap();
        assert_eq!(broker.selection().long_cue_id, "gong");
    }
}
