//! Coarse song metadata: tempo from note onsets, key from pitch classes.

use serde::{Deserialize, Serialize};

use crate::note::Note;
use crate::tuning::PITCH_CLASS_NAMES;

pub const DEFAULT_BPM: u32 = 120;
pub const MIN_BPM: u32 = 60;
pub const MAX_BPM: u32 = 200;

/// Only the first intervals feed the tempo estimate.
const MAX_TEMPO_INTERVALS: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongMetadata {
    pub bpm: u32,
    pub key: String,
    pub time_signature: String,
    pub duration_sec: f32,
    pub note_count: usize,
}

/// Estimates tempo and key for merged `notes` spanning `duration_sec`.
pub fn analyze_metadata(notes: &[Note], duration_sec: f32) -> SongMetadata {
    SongMetadata {
        bpm: estimate_bpm(notes),
        key: estimate_key(notes).to_string(),
        time_signature: "4/4".to_string(),
        duration_sec,
        note_count: notes.len(),
    }
}

/// Tempo from the median inter-onset interval, clamped to [60, 200] BPM.
///
/// Fewer than two notes give the default of 120. With an even number of
/// intervals the upper of the two middle values is used, not their mean.
pub fn estimate_bpm(notes: &[Note]) -> u32 {
    if notes.len() < 2 {
        return DEFAULT_BPM;
    }

    let mut intervals: Vec<f32> = notes
        .windows(2)
        .take(MAX_TEMPO_INTERVALS)
        .map(|pair| pair[1].start_time_sec - pair[0].start_time_sec)
        .collect();
    intervals.sort_by(|a, b| a.total_cmp(b));
    let median = intervals[intervals.len() / 2];

    if median <= 0.0 {
        // Simultaneous onsets: as fast as we report.
        return MAX_BPM;
    }
    (60.0 / median)
        .round()
        .clamp(MIN_BPM as f32, MAX_BPM as f32) as u32
}

/// Most frequent pitch class; ties go to the lowest class, no notes give "C".
pub fn estimate_key(notes: &[Note]) -> &'static str {
    let mut histogram = [0usize; 12];
    for note in notes {
        histogram[note.pitch_class()] += 1;
    }

    let mut best = 0;
    for (pitch_class, &count) in histogram.iter().enumerate() {
        if count > histogram[best] {
            best = pitch_class;
        }
    }
    PITCH_CLASS_NAMES[best]
}
