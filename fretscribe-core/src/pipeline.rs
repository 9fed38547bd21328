//! # Transcription Pipeline Module
//!
//! Runs the full signal-to-tablature chain on one sample buffer:
//! detection, merging, then rendering and metadata analysis on the merged
//! notes.
//!
//! The pipeline keeps no state between runs, so independent buffers can be
//! transcribed concurrently.

use serde::Serialize;
use tracing::{debug, info};

use crate::audio::SampleBuffer;
use crate::config::{DetectionMode, TranscriptionConfig};
use crate::detection::{Detection, DetectionStats, NoteDetector};
use crate::error::ConfigError;
use crate::merge::merge_notes;
use crate::metadata::{SongMetadata, analyze_metadata};
use crate::note::Note;
use crate::tablature::{RenderStats, Tablature, TablatureRenderer};

/// Counters gathered along the pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    pub detection: DetectionStats,
    pub merged_notes: usize,
    pub render: RenderStats,
}

/// Everything one run produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transcription {
    /// Merged notes, in time order.
    pub notes: Vec<Note>,
    pub tablature: Tablature,
    pub metadata: SongMetadata,
    pub diagnostics: Diagnostics,
}

/// Transcribes `buffer` with `config`.
///
/// This function:
/// 1. Detects note candidates, sequentially or on a worker pool
/// 2. Merges sustained candidates into notes
/// 3. Renders the tablature and estimates tempo and key from the same notes
///
/// # Returns
/// * `Ok(transcription)` - Always, for any audio content (silence included)
/// * `Err(ConfigError)` - If the configuration is invalid
pub fn transcribe(
    buffer: &SampleBuffer,
    config: &TranscriptionConfig,
) -> Result<Transcription, ConfigError> {
    config.validate()?;

    let detector = NoteDetector::new().with_prefilter(config.dedup_prefilter);
    let Detection { notes: candidates, stats } = match config.detection {
        DetectionMode::Sequential => detector.detect(buffer).into_detection(),
        DetectionMode::Parallel { workers } => detector.detect_parallel(buffer, workers),
    };
    debug!(
        windows = stats.windows,
        silent = stats.silent,
        unpitched = stats.unpitched,
        candidates = candidates.len(),
        "Detection finished"
    );

    let notes = merge_notes(&candidates);
    debug!(before = candidates.len(), after = notes.len(), "Merged notes");

    let tablature = TablatureRenderer::from_config(config).render(&notes);
    let metadata = analyze_metadata(&notes, buffer.duration_sec());

    let diagnostics = Diagnostics {
        detection: stats,
        merged_notes: notes.len(),
        render: tablature.stats,
    };
    info!(
        notes = notes.len(),
        mapped = diagnostics.render.mapped,
        unmapped = diagnostics.render.unmapped,
        bpm = metadata.bpm,
        key = %metadata.key,
        "Transcription complete"
    );

    Ok(Transcription {
        notes,
        tablature,
        metadata,
        diagnostics,
    })
}
