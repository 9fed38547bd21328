//! Settings and export files.

use anyhow::{Context, Result};
use fretscribe_core::TranscriptionConfig;
use serde::Serialize;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Saves the transcription settings to a JSON file.
///
/// # Arguments
/// * `config` - The settings to save
/// * `path` - Destination file (e.g. "fretscribe.json")
pub fn save_settings(config: &TranscriptionConfig, path: &Path) -> Result<()> {
    write_json(config, path)
}

/// Loads transcription settings from a JSON file.
///
/// Missing fields fall back to their defaults, so a file holding only
/// `{ "tuning": "dropd" }` is valid.
///
/// # Returns
/// * `Ok(config)` - The loaded and validated settings
/// * `Err(e)` - File I/O, JSON or validation error
pub fn load_settings(path: &Path) -> Result<TranscriptionConfig> {
    let mut file = File::open(path)
        .with_context(|| format!("Failed to open settings file {}", path.display()))?;
    let mut data = String::new();
    file.read_to_string(&mut data)?;
    let config: TranscriptionConfig = serde_json::from_str(&data)
        .with_context(|| format!("Invalid settings in {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

/// Writes any serializable value as pretty-printed JSON.
pub fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let json_string = serde_json::to_string_pretty(value)?;
    let mut file = File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    file.write_all(json_string.as_bytes())?;
    Ok(())
}
