//! Persisted preferences: timer configuration, cue selection, presets,
//! reminders and history in one TOML document.
//!
//! Loading never fails hard on content: a missing file yields defaults, and a
//! malformed section falls back to its default on its own.
//!
//! Stored at `~/.config/cuetimer/preferences.toml`.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::audio::{clamp_volume, AudioCueSelection};
use crate::error::ConfigError;
use crate::history::HistoryEntry;
use crate::timer::{PresetList, ReminderDraft, ReminderSet, TimerConfig};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub audio: AudioCueSelection,
    #[serde(default)]
    pub presets: PresetList,
    #[serde(default)]
    pub reminders: Vec<ReminderDraft>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

fn section<T: DeserializeOwned + Default>(table: &toml::Table, key: &str) -> T {
    match table.get(key) {
        None => T::default(),
        Some(value) => value.clone().try_into().unwrap_or_else(|e| {
            tracing::warn!("ignoring malformed '{key}' preferences: {e}");
            T::default()
        }),
    }
}

impl Preferences {
    /// Parse leniently, section by section.
    pub fn from_toml(content: &str) -> Self {
        let table: toml::Table = match content.parse() {
            Ok(table) => table,
            Err(e) => {
                tracing::warn!("preferences unreadable, using defaults: {e}");
                return Self::default();
            }
        };

        let mut prefs = Self {
            timer: section(&table, "timer"),
            audio: section(&table, "audio"),
            presets: section(&table, "presets"),
            reminders: section(&table, "reminders"),
            history: section(&table, "history"),
        };
        prefs.audio.volume = clamp_volume(prefs.audio.volume);
        prefs
    }

    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    /// Get a value as string by dot-separated key, e.g. `audio.volume`.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        match json.pointer(&json_pointer(key)?)? {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key. The raw text is read as the type of
    /// the value it replaces, and the result must still be a valid
    /// configuration: a startable timer whose countdown holds every
    /// reminder. Nothing changes otherwise.
    ///
    /// # Errors
    /// Unknown keys, unparsable values, and values that leave the timer
    /// unstartable or a reminder beyond the countdown target.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        let slot = json_pointer(key)
            .and_then(|pointer| json.pointer_mut(&pointer))
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        *slot = coerce_like(slot, value).map_err(invalid)?;

        let mut updated: Preferences =
            serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        updated
            .timer
            .validate()
            .and_then(|()| {
                ReminderSet::check_fits(
                    updated.reminders.iter().map(|r| r.at_seconds),
                    &updated.timer,
                )
            })
            .map_err(|e| invalid(e.to_string()))?;
        updated.audio.volume = clamp_volume(updated.audio.volume);
        *self = updated;
        Ok(())
    }
}

/// `audio.volume` -> `/audio/volume`. Empty segments are not keys.
fn json_pointer(key: &str) -> Option<String> {
    if key.split('.').any(str::is_empty) {
        return None;
    }
    Some(format!("/{}", key.replace('.', "/")))
}

/// Parse `raw` as the same JSON type as `existing`.
fn coerce_like(existing: &serde_json::Value, raw: &str) -> Result<serde_json::Value, String> {
    use serde_json::Value;

    match existing {
        Value::Bool(_) => raw.parse::<bool>().map(Value::Bool).map_err(|e| e.to_string()),
        Value::Number(_) => match raw.parse::<u64>() {
            Ok(n) => Ok(Value::from(n)),
            Err(_) => raw
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| format!("cannot parse '{raw}' as number")),
        },
        Value::Object(_) | Value::Array(_) => serde_json::from_str(raw).map_err(|e| e.to_string()),
        _ => Ok(Value::String(raw.to_string())),
    }
}

/// Where preferences live. Writes are best-effort from the engine's point of
/// view: a failed save is logged, never rolled back.
pub trait PreferenceStore {
    /// # Errors
    /// Only for an unavailable store; bad content yields defaults.
    fn load(&self) -> Result<Preferences, ConfigError>;

    /// # Errors
    /// Returns an error if the preferences cannot be written.
    fn save(&self, prefs: &Preferences) -> Result<(), ConfigError>;
}

/// TOML file store.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Open the store at `<data_dir>/preferences.toml`.
    ///
    /// # Errors
    /// Returns an error if the data directory is unavailable.
    pub fn open() -> Result<Self, ConfigError> {
        Ok(Self {
            path: data_dir()?.join("preferences.toml"),
        })
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for FileStore {
    fn load(&self) -> Result<Preferences, ConfigError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(Preferences::from_toml(&content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Preferences::default()),
            Err(e) => Err(ConfigError::LoadFailed {
                path: self.path.clone(),
                message: e.to_string(),
            }),
        }
    }

    fn save(&self, prefs: &Preferences) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: self.path.clone(),
            message,
        };
        let content = prefs.to_toml()?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
        std::fs::write(&self.path, content).map_err(|e| save_failed(e.to_string()))
    }
}

#[derive(Debug, Default)]
struct MemoryStoreInner {
    prefs: Option<Preferences>,
    saves: usize,
    unavailable: bool,
}

/// In-memory store. Clones share contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryStoreInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefs(prefs: Preferences) -> Self {
        let store = Self::new();
        store.lock().prefs = Some(prefs);
        store
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryStoreInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Last saved (or seeded) preferences.
    pub fn stored(&self) -> Option<Preferences> {
        self.lock().prefs.clone()
    }

    pub fn save_count(&self) -> usize {
        self.lock().saves
    }

    /// Simulate storage going away: every later load and save fails.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }
}

impl PreferenceStore for MemoryStore {
    fn load(&self) -> Result<Preferences, ConfigError> {
        let inner = self.lock();
        if inner.unavailable {
            return Err(ConfigError::LoadFailed {
                path: PathBuf::from("<memory>"),
                message: "store unavailable".into(),
            });
        }
        Ok(inner.prefs.clone().unwrap_or_default())
    }

    fn save(&self, prefs: &Preferences) -> Result<(), ConfigError> {
        let mut inner = self.lock();
        if inner.unavailable {
            return Err(ConfigError::SaveFailed {
                path: PathBuf::from("<memory>"),
                message: "store unavailable".into(),
            });
        }
        inner.prefs = Some(prefs.clone());
        inner.saves += 1;
        Ok(())
    }
}
