//! Playback backends.
//!
//! The broker only needs three things from a backend: start a decoded cue at
//! a gain, stop a specific playback, and say whether a playback is still
//! audible.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use super::catalog::DecodedCue;
use crate::error::AudioError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlaybackId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CueKind {
    /// Reminder and final-countdown tick.
    Short,
    /// Completion alarm.
    Long,
}

pub trait CueOutput {
    fn start(&mut self, cue: &DecodedCue, kind: CueKind, volume: f64)
        -> Result<PlaybackId, AudioError>;

    fn stop(&mut self, id: PlaybackId);

    fn is_active(&self, id: PlaybackId) -> bool;
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedPlayback {
    pub id: PlaybackId,
    pub cue: String,
    pub kind: CueKind,
    pub volume: f64,
    pub stopped: bool,
}

#[derive(Debug, Default)]
struct MemoryOutputInner {
    playbacks: Vec<RecordedPlayback>,
    fail_next: Option<AudioError>,
}

/// Records every playback; a cue stays active until stopped. Clones share
/// the same record, so a test can keep one handle and give the other away.
#[derive(Debug, Clone, Default)]
pub struct MemoryOutput {
    inner: Arc<Mutex<MemoryOutputInner>>,
}

impl MemoryOutput {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryOutputInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn playbacks(&self) -> Vec<RecordedPlayback> {
        self.lock().playbacks.clone()
    }

    pub fn count(&self, kind: CueKind) -> usize {
        self.lock()
            .playbacks
            .iter()
            .filter(|p| p.kind == kind)
            .count()
    }

    pub fn active(&self) -> Vec<RecordedPlayback> {
        self.lock()
            .playbacks
            .iter()
            .filter(|p| !p.stopped)
            .cloned()
            .collect()
    }

    /// Make the next `start` fail with `error`.
    pub fn fail_next(&self, error: AudioError) {
        self.lock().fail_next = Some(error);
    }
}

impl CueOutput for MemoryOutput {
    fn start(
        &mut self,
        cue: &DecodedCue,
        kind: CueKind,
        volume: f64,
    ) -> Result<PlaybackId, AudioError> {
        let mut inner = self.lock();
        if let Some(err) = inner.fail_next.take() {
            return Err(err);
        }
        let id = PlaybackId(inner.playbacks.len() as u64 + 1);
        inner.playbacks.push(RecordedPlayback {
            id,
            cue: cue.id.clone(),
            kind,
            volume,
            stopped: false,
        });
        Ok(id)
    }

    fn stop(&mut self, id: PlaybackId) {
        if let Some(p) = self.lock().playbacks.iter_mut().find(|p| p.id == id) {
            p.stopped = true;
        }
    }

    fn is_active(&self, id: PlaybackId) -> bool {
        self.lock()
            .playbacks
            .iter()
            .any(|p| p.id == id && !p.stopped)
    }
}
