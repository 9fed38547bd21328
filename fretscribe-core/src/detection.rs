//! # Note Detection Module
//!
//! Turns a sample buffer into a time-ordered stream of note candidates.
//!
//! Detection is split in two stages:
//! 1. **Window analysis** (`analyze_window`): energy gate and pitch estimate
//!    for one window. Windows are independent, so this stage can run on a
//!    worker pool (`NoteDetector::detect_parallel`).
//! 2. **Emission** (`NoteEmitter`): octave correction, the duplicate
//!    pre-filter and note construction. This stage depends on the previously
//!    emitted note and always sees windows in index order.

use serde::Serialize;
use std::thread;
use tracing::debug;

use crate::audio::{SampleBuffer, mean_square_energy};
use crate::note::Note;
use crate::pitch::{GUITAR_MAX_FREQ, GUITAR_MIN_FREQ, estimate_pitch};
use crate::tuning::frequency_to_midi;

/// Windows with a mean-square energy below this are treated as silence.
pub const ENERGY_GATE: f32 = 0.005;

/// Lowest MIDI pitch kept after octave correction (E2).
pub const GUITAR_MIN_MIDI: f32 = 40.0;
/// Highest MIDI pitch kept after octave correction (E6).
pub const GUITAR_MAX_MIDI: f32 = 88.0;

/// Candidates within this many semitones of the previous emission...
const DEDUP_PITCH_SEMITONES: f32 = 0.5;
/// ...and starting within this many seconds of it are skipped.
const DEDUP_WINDOW_SEC: f32 = 0.25;

/// What a single window yielded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowOutcome {
    /// Energy below `ENERGY_GATE`; pitch estimation was not run.
    Silent,
    /// Loud enough, but no pitch could be estimated.
    Unpitched,
    /// Estimated fundamental in Hz.
    Pitched(f32),
}

/// Result of analyzing one window, tagged with its position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowAnalysis {
    pub index: usize,
    pub start_sec: f32,
    pub energy: f32,
    pub outcome: WindowOutcome,
}

/// Per-run counters. Nothing here is an error; they explain why a buffer
/// produced fewer notes than windows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DetectionStats {
    pub windows: usize,
    pub silent: usize,
    pub unpitched: usize,
    pub out_of_range: usize,
    pub prefiltered: usize,
    pub emitted: usize,
}

/// Notes and counters from a complete detection run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Detection {
    pub notes: Vec<Note>,
    pub stats: DetectionStats,
}

/// Runs the energy gate and pitch estimator on window `index` of `buffer`.
pub fn analyze_window(buffer: &SampleBuffer, index: usize) -> WindowAnalysis {
    let window = buffer.window(index);
    let energy = mean_square_energy(window);

    let outcome = if energy < ENERGY_GATE {
        WindowOutcome::Silent
    } else {
        match estimate_pitch(window, buffer.sample_rate(), GUITAR_MIN_FREQ, GUITAR_MAX_FREQ) {
            Some(freq) => WindowOutcome::Pitched(freq),
            None => WindowOutcome::Unpitched,
        }
    };

    WindowAnalysis {
        index,
        start_sec: buffer.window_start_sec(index),
        energy,
        outcome,
    }
}

/// Shifts a MIDI pitch by whole octaves into the guitar range.
///
/// The detector passes a pitch already rounded to the nearest semitone, so a
/// raw 39.6 arrives here as 40 and is kept rather than lifted to 52.
///
/// Pitches more than an octave outside the range are folded in octave steps,
/// then a single extra octave step is allowed at each end.
///
/// # Returns
/// * `Some(pitch)` - Corrected pitch within [40, 88]
/// * `None` - The pitch could not be brought into range
pub fn correct_octave(raw_pitch: f32) -> Option<f32> {
    if !raw_pitch.is_finite() {
        return None;
    }
    let mut pitch = raw_pitch;
    while pitch < GUITAR_MIN_MIDI - 12.0 {
        pitch += 12.0;
    }
    while pitch > GUITAR_MAX_MIDI + 12.0 {
        pitch -= 12.0;
    }
    if pitch < GUITAR_MIN_MIDI {
        pitch += 12.0;
    } else if pitch > GUITAR_MAX_MIDI {
        pitch -= 12.0;
    }

    (GUITAR_MIN_MIDI..=GUITAR_MAX_MIDI)
        .contains(&pitch)
        .then_some(pitch)
}

/// Sequential emission stage.
///
/// Feeds on window analyses in index order and decides which become notes.
#[derive(Debug, Clone)]
pub struct NoteEmitter {
    hop_sec: f32,
    prefilter: bool,
    last_emitted: Option<Note>,
    stats: DetectionStats,
}

impl NoteEmitter {
    pub fn new(hop_sec: f32, prefilter: bool) -> Self {
        Self {
            hop_sec,
            prefilter,
            last_emitted: None,
            stats: DetectionStats::default(),
        }
    }

    /// Consumes one analysis and returns the note it produces, if any.
    pub fn accept(&mut self, analysis: &WindowAnalysis) -> Option<Note> {
        self.stats.windows += 1;

        let freq = match analysis.outcome {
            WindowOutcome::Silent => {
                self.stats.silent += 1;
                return None;
            }
            WindowOutcome::Unpitched => {
                self.stats.unpitched += 1;
                return None;
            }
            WindowOutcome::Pitched(freq) => freq,
        };

        // Rounded first so a slightly flat low E (39.9) is not lifted an octave.
        let Some(pitch) = correct_octave(frequency_to_midi(freq).round()) else {
            self.stats.out_of_range += 1;
            return None;
        };

        if self.prefilter {
            if let Some(previous) = &self.last_emitted {
                let close_in_pitch = (pitch - previous.midi_pitch).abs() < DEDUP_PITCH_SEMITONES;
                let close_in_time = analysis.start_sec - previous.start_time_sec < DEDUP_WINDOW_SEC;
                if close_in_pitch && close_in_time {
                    self.stats.prefiltered += 1;
                    return None;
                }
            }
        }

        let note = Note {
            midi_pitch: pitch,
            frequency_hz: freq,
            start_time_sec: analysis.start_sec,
            duration_sec: self.hop_sec,
            velocity: (analysis.energy * 10.0).min(1.0),
        };
        self.last_emitted = Some(note);
        self.stats.emitted += 1;
        Some(note)
    }

    pub fn stats(&self) -> DetectionStats {
        self.stats
    }
}

/// Note detector over fixed-size overlapping windows.
#[derive(Debug, Clone, Copy)]
pub struct NoteDetector {
    prefilter: bool,
}

impl Default for NoteDetector {
    fn default() -> Self {
        Self { prefilter: true }
    }
}

impl NoteDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables the duplicate pre-filter (on by default).
    pub fn with_prefilter(mut self, enabled: bool) -> Self {
        self.prefilter = enabled;
        self
    }

    /// Lazily detects notes, one window at a time.
    pub fn detect<'a>(&self, buffer: &'a SampleBuffer) -> DetectedNotes<'a> {
        DetectedNotes {
            buffer,
            next_window: 0,
            emitter: NoteEmitter::new(buffer.hop_duration_sec(), self.prefilter),
        }
    }

    /// Detects notes, analyzing windows on `workers` threads.
    ///
    /// Window indices are fanned out over a bounded channel and the analyses
    /// come back tagged with their index. They are sorted before emission,
    /// so the result is identical to the sequential `detect`.
    pub fn detect_parallel(&self, buffer: &SampleBuffer, workers: usize) -> Detection {
        let analyses = analyze_windows_parallel(buffer, workers);
        let mut emitter = NoteEmitter::new(buffer.hop_duration_sec(), self.prefilter);
        let notes = analyses
            .iter()
            .filter_map(|analysis| emitter.accept(analysis))
            .collect();
        Detection {
            notes,
            stats: emitter.stats(),
        }
    }
}

/// Iterator returned by `NoteDetector::detect`.
#[derive(Debug)]
pub struct DetectedNotes<'a> {
    buffer: &'a SampleBuffer,
    next_window: usize,
    emitter: NoteEmitter,
}

impl DetectedNotes<'_> {
    /// Counters for the windows consumed so far.
    pub fn stats(&self) -> DetectionStats {
        self.emitter.stats()
    }

    /// Drains the remaining windows into a `Detection`.
    pub fn into_detection(mut self) -> Detection {
        let notes = self.by_ref().collect();
        Detection {
            notes,
            stats: self.stats(),
        }
    }
}

impl Iterator for DetectedNotes<'_> {
    type Item = Note;

    fn next(&mut self) -> Option<Note> {
        while self.next_window < self.buffer.window_count() {
            let analysis = analyze_window(self.buffer, self.next_window);
            self.next_window += 1;
            if let Some(note) = self.emitter.accept(&analysis) {
                return Some(note);
            }
        }
        None
    }
}

/// Analyzes every window of `buffer` on a pool of scoped worker threads and
/// returns the analyses in window order.
pub fn analyze_windows_parallel(buffer: &SampleBuffer, workers: usize) -> Vec<WindowAnalysis> {
    let count = buffer.window_count();
    if count == 0 {
        return Vec::new();
    }
    let workers = workers.clamp(1, count);
    debug!(windows = count, workers, "Analyzing windows in parallel");

    let (job_tx, job_rx) = crossbeam_channel::bounded::<usize>(workers * 4);
    let (result_tx, result_rx) = crossbeam_channel::unbounded::<WindowAnalysis>();

    thread::scope(|scope| {
        for _ in 0..workers {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            scope.spawn(move || {
                for index in job_rx.iter() {
                    if result_tx.send(analyze_window(buffer, index)).is_err() {
                        break;
                    }
                }
            });
        }
        drop(result_tx);

        for index in 0..count {
            if job_tx.send(index).is_err() {
                break;
            }
        }
        // Closing the job channel lets the workers finish.
        drop(job_tx);
    });

    let mut analyses: Vec<WindowAnalysis> = result_rx.iter().collect();
    analyses.sort_by_key(|analysis| analysis.index);
    analyses
}
