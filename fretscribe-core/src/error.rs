//! Errors surfaced to callers of the transcription pipeline.
//!
//! Everything that can go wrong with the *audio* (silence, unpitched windows,
//! notes outside the guitar range, unplayable pitches) is absorbed and counted
//! in the diagnostics. Only caller contract violations end up here.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Unknown tuning '{0}' (expected one of: standard, dropd, halfdrop, fulldrop, dropc)")]
    UnknownTuning(String),
    #[error("Unknown difficulty '{0}' (expected one of: beginner, intermediate, advanced)")]
    UnknownDifficulty(String),
    #[error("Sample rate must be positive")]
    InvalidSampleRate,
    #[error("Parallel detection needs at least one worker")]
    NoWorkers,
}
