//! Cue output for terminals: rings the bell on stderr.
//!
//! A playback stays active for the decoded cue's natural length so the
//! broker's long-cue bookkeeping and the post-completion auto-stop behave the
//! same as with a real device.

use std::collections::HashMap;
use std::io::Write;
use std::time::Instant;

use cuetimer_core::audio::{CueKind, CueOutput, DecodedCue, PlaybackId};
use cuetimer_core::AudioError;

#[derive(Debug, Default)]
pub struct TerminalBell {
    next_id: u64,
    active: HashMap<PlaybackId, Instant>,
}

impl TerminalBell {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CueOutput for TerminalBell {
    fn start(
        &mut self,
        cue: &DecodedCue,
        kind: CueKind,
        volume: f64,
    ) -> Result<PlaybackId, AudioError> {
        if volume > 0.0 {
            let rings = match kind {
                CueKind::Short => "\x07",
                CueKind::Long => "\x07\x07\x07",
            };
            let mut stderr = std::io::stderr();
            stderr
                .write_all(rings.as_bytes())
                .and_then(|_| stderr.flush())
                .map_err(|e| AudioError::Output(e.to_string()))?;
        }

        self.next_id += 1;
        let id = PlaybackId(self.next_id);
        self.active.insert(id, Instant::now() + cue.duration());
        Ok(id)
    }

    fn stop(&mut self, id: PlaybackId) {
        self.active.remove(&id);
    }

    fn is_active(&self, id: PlaybackId) -> bool {
        self.active
            .get(&id)
            .is_some_and(|end| Instant::now() < *end)
    }
}
