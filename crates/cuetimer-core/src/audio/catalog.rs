//! Cue catalog and decoding.
//!
//! The catalog maps cue ids to WAV files. Decoding happens on tokio's
//! blocking pool; each result is delivered as soon as it is ready so the
//! timer never waits on it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::error::AudioError;

pub const DEFAULT_SHORT_CUE: &str = "chime";
pub const DEFAULT_LONG_CUE: &str = "phone_ring";

const BUILTIN_CUES: [&str; 6] = ["chime", "ding", "notify", "bell", "gong", "phone_ring"];

/// Result of decoding one catalog entry.
pub type DecodeResult = (String, Result<DecodedCue, AudioError>);

#[derive(Debug, Clone, Default)]
pub struct CueCatalog {
    entries: BTreeMap<String, PathBuf>,
}

impl CueCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in cue set, resolved to `<dir>/<id>.wav`.
    pub fn builtin(dir: &Path) -> Self {
        let entries = BUILTIN_CUES
            .iter()
            .map(|id| (id.to_string(), dir.join(format!("{id}.wav"))))
            .collect();
        Self { entries }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn source(&self, id: &str) -> Option<&Path> {
        self.entries.get(id).map(PathBuf::as_path)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// PCM samples of a cue, interleaved, normalized to -1.0 ..= 1.0.
#[derive(Debug, Clone)]
pub struct DecodedCue {
    pub id: String,
    pub samples: Arc<[f32]>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl DecodedCue {
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 || self.channels == 0 {
            return Duration::ZERO;
        }
        let frames = self.samples.len() as f64 / self.channels as f64;
        Duration::from_secs_f64(frames / self.sample_rate as f64)
    }
}

/// Decode one WAV file.
///
/// # Errors
/// Returns [`AudioError::DecodeFailed`] if the file is missing or unreadable.
pub fn decode_wav(id: &str, path: &Path) -> Result<DecodedCue, AudioError> {
    let failed = |message: String| AudioError::DecodeFailed {
        cue: id.to_string(),
        message,
    };

    let mut reader = hound::WavReader::open(path).map_err(|e| failed(e.to_string()))?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(|e| failed(e.to_string()))?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.saturating_sub(1) as u32)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()
                .map_err(|e| failed(e.to_string()))?
        }
    };

    Ok(DecodedCue {
        id: id.to_string(),
        samples: samples.into(),
        sample_rate: spec.sample_rate,
        channels: spec.channels,
    })
}

/// Decode every catalog entry in the background.
///
/// Results arrive on the returned channel in completion order; the channel
/// closes once every entry has reported. Must be called inside a tokio
/// runtime.
pub fn spawn_decoding(catalog: &CueCatalog) -> mpsc::UnboundedReceiver<DecodeResult> {
    let (tx, rx) = mpsc::unbounded_channel();
    for (id, path) in &catalog.entries {
        let tx = tx.clone();
        let id = id.clone();
        let path = path.clone();
        tokio::spawn(async move {
            let task_id = id.clone();
            let result = tokio::task::spawn_blocking(move || decode_wav(&task_id, &path))
                .await
                .unwrap_or_else(|e| {
                    Err(AudioError::DecodeFailed {
                        cue: id.clone(),
                        message: e.to_string(),
                    })
                });
            // receiver gone means nobody is listening any more
            let _ = tx.send((id, result));
        });
    }
    rx
}

/// Decode every catalog entry and wait for all of them.
pub async fn decode_all(catalog: &CueCatalog) -> Vec<DecodeResult> {
    let mut rx = spawn_decoding(catalog);
    let mut out = Vec::with_capacity(catalog.len());
    while let Some(result) = rx.recv().await {
        out.push(result);
    }
    out
}
