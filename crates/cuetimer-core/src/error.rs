//! Core error types for cuetimer-core.
//!
//! Validation problems are returned synchronously and never mutate state.
//! Audio and storage problems are "resource unavailable" conditions: they are
//! logged and the affected feature degrades, the timer keeps running.

use std::path::PathBuf;
use thiserror::Error;

use crate::timer::ReminderId;

/// Core error type for cuetimer-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Invalid configuration or reminder input
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Preference storage errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Cue loading or playback errors
    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Rejected configuration or reminder edits.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Countdown mode cannot run without a positive target
    #[error("countdown target must be greater than zero")]
    NonPositiveCountdownTarget,

    /// Reminder time below zero
    #[error("reminder time cannot be negative (got {at}s)")]
    NegativeReminder { at: i64 },

    /// Countdown reminder past the configured duration
    #[error("reminder at {at}s exceeds the countdown target of {target}s")]
    ReminderBeyondTarget { at: i64, target: u64 },

    /// No reminder with this id
    #[error("no reminder with id {0}")]
    UnknownReminder(ReminderId),

    /// Preset index out of range
    #[error("preset index {index} out of bounds (length: {len})")]
    UnknownPreset { index: usize, len: usize },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Preference storage errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load preferences
    #[error("Failed to load preferences from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save preferences
    #[error("Failed to save preferences to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid value for an existing key
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Failed to parse preferences
    #[error("Failed to parse preferences: {0}")]
    ParseFailed(String),

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Cue catalog and playback errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    /// Cue id not present in the catalog
    #[error("unknown cue '{0}'")]
    UnknownCue(String),

    /// Cue exists but has not finished decoding (or failed to)
    #[error("cue '{0}' is not decoded")]
    NotDecoded(String),

    /// Cue source could not be read or decoded
    #[error("failed to decode cue '{cue}': {message}")]
    DecodeFailed { cue: String, message: String },

    /// Output backend refused to start playback
    #[error("audio output error: {0}")]
    Output(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for CoreError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        CoreError::Custom(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_convert_and_display() {
        let err: CoreError = ValidationError::ReminderBeyondTarget { at: 90, target: 60 }.into();
        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(
            err.to_string(),
            "Validation error: reminder at 90s exceeds the countdown target of 60s"
        );
    }

    #[test]
    fn toml_errors_become_parse_failures() {
        let parse_err = "timer = [".parse::<toml::Table>().unwrap_err();
        let err: ConfigError = parse_err.into();
        assert!(matches!(err, ConfigError::ParseFailed(_)));

        let err: CoreError = err.into();
        assert!(err.to_string().starts_with("Configuration error:"));
    }
}
