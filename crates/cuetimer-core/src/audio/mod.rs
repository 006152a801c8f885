//! Audible alerts: catalog decoding, playback backends and the broker that
//! arbitrates between short and long cues.

mod broker;
pub mod catalog;
pub mod output;

pub use broker::{clamp_volume, AudioCueBroker, AudioCueSelection};
pub use catalog::{
    decode_all, decode_wav, spawn_decoding, CueCatalog, DecodeResult, DecodedCue,
    DEFAULT_LONG_CUE, DEFAULT_SHORT_CUE,
};
pub use output::{CueKind, CueOutput, MemoryOutput, PlaybackId, RecordedPlayback};
