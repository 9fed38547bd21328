//! Transcription settings.
//!
//! The settings are plain serde data so front-ends can load them from a file
//! and override single fields from their own options.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::tuning::{Difficulty, TuningPreset};

/// How window analysis is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum DetectionMode {
    /// Analyze windows one after another on the calling thread.
    #[default]
    Sequential,
    /// Analyze windows on a pool of worker threads.
    Parallel { workers: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionConfig {
    pub tuning: TuningPreset,
    pub difficulty: Difficulty,
    /// Free text shown in the tablature header.
    pub style: String,
    pub detection: DetectionMode,
    /// Skip near-identical candidates within 0.25 s before merging.
    pub dedup_prefilter: bool,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            tuning: TuningPreset::Standard,
            difficulty: Difficulty::Intermediate,
            style: "default".to_string(),
            detection: DetectionMode::Sequential,
            dedup_prefilter: true,
        }
    }
}

impl TranscriptionConfig {
    /// Builds a config from catalog names.
    ///
    /// # Returns
    /// * `Err(ConfigError::UnknownTuning)` / `Err(ConfigError::UnknownDifficulty)`
    ///   for names outside the catalog
    pub fn from_names(tuning: &str, difficulty: &str, style: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            tuning: tuning.parse()?,
            difficulty: difficulty.parse()?,
            style: style.to_string(),
            ..Self::default()
        })
    }

    /// Checks the settings that serde alone cannot rule out.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.detection {
            DetectionMode::Parallel { workers: 0 } => Err(ConfigError::NoWorkers),
            _ => Ok(()),
        }
    }
}
