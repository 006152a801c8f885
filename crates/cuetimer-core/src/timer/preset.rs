//! Quick-start presets: named countdown durations.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::time_math::{format_time, hms_to_seconds};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    #[serde(default)]
    pub hours: u64,
    #[serde(default)]
    pub minutes: u64,
    #[serde(default)]
    pub seconds: u64,
    #[serde(default)]
    pub label: String,
}

impl Preset {
    pub fn new(hours: u64, minutes: u64, seconds: u64, label: impl Into<String>) -> Self {
        Self {
            hours,
            minutes,
            seconds,
            label: label.into(),
        }
    }

    pub fn total_seconds(&self) -> u64 {
        hms_to_seconds(self.hours, self.minutes, self.seconds)
    }

    /// The label, or the formatted duration when the label is blank.
    pub fn display_label(&self) -> String {
        let label = self.label.trim();
        if label.is_empty() {
            format_time(self.total_seconds())
        } else {
            label.to_string()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PresetList {
    presets: Vec<Preset>,
}

impl Default for PresetList {
    fn default() -> Self {
        Self {
            presets: vec![
                Preset::new(0, 5, 0, "5 min"),
                Preset::new(0, 15, 0, "15 min"),
                Preset::new(0, 25, 0, "25 min"),
                Preset::new(0, 30, 0, "30 min"),
                Preset::new(0, 45, 0, "45 min"),
                Preset::new(1, 0, 0, "1 hour"),
            ],
        }
    }
}

impl PresetList {
    pub fn new(presets: Vec<Preset>) -> Self {
        Self { presets }
    }

    pub fn add(&mut self, preset: Preset) -> usize {
        self.presets.push(preset);
        self.presets.len() - 1
    }

    pub fn update(&mut self, index: usize, preset: Preset) -> Result<(), ValidationError> {
        let len = self.presets.len();
        let slot = self
            .presets
            .get_mut(index)
            .ok_or(ValidationError::UnknownPreset { index, len })?;
        *slot = preset;
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<Preset, ValidationError> {
        if index >= self.presets.len() {
            return Err(ValidationError::UnknownPreset {
                index,
                len: self.presets.len(),
            });
        }
        Ok(self.presets.remove(index))
    }

    pub fn get(&self, index: usize) -> Result<&Preset, ValidationError> {
        self.presets.get(index).ok_or(ValidationError::UnknownPreset {
            index,
            len: self.presets.len(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Preset> {
        self.presets.iter()
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}
