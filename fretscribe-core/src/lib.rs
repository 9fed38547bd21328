// fretscribe-core/src/lib.rs

//! The core logic for turning a recorded guitar line into tablature.
//! This crate is responsible for pitch estimation, note detection and
//! merging, fretboard mapping, tablature rendering and song metadata.
//! It is completely headless: it never opens files or audio devices, it only
//! works on sample buffers handed to it.

pub mod audio;
pub mod config;
pub mod detection;
pub mod error;
pub mod fretboard;
pub mod merge;
pub mod metadata;
pub mod note;
pub mod pipeline;
pub mod pitch;
pub mod tablature;
pub mod tuning;

pub use audio::SampleBuffer;
pub use config::{DetectionMode, TranscriptionConfig};
pub use error::ConfigError;
pub use note::Note;
pub use pipeline::{Diagnostics, Transcription, transcribe};
pub use tablature::Tablature;
pub use tuning::{Difficulty, TuningPreset};
