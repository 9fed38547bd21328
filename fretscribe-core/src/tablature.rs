//! # Tablature Rendering Module
//!
//! Lays merged notes onto a fixed measure grid and renders it as text.
//!
//! ## Layout
//! - 4 beats per measure, 0.5 s per beat (2.0 s measures)
//! - 16 subdivisions per measure, 4 per beat
//! - At most 20 measures are rendered
//! - Rows are printed highest string first, with a `|` between beats
//!
//! Notes the fretboard mapper cannot place are left out of the grid and
//! counted in `RenderStats::unmapped`.

use serde::Serialize;
use std::fmt;
use tracing::{debug, warn};

use crate::config::TranscriptionConfig;
use crate::fretboard::map_pitch;
use crate::note::Note;
use crate::tuning::{Difficulty, STRING_COUNT, TuningPreset};

pub const BEATS_PER_MEASURE: usize = 4;
pub const SECONDS_PER_BEAT: f32 = 0.5;
pub const MEASURE_DURATION_SEC: f32 = BEATS_PER_MEASURE as f32 * SECONDS_PER_BEAT;
pub const SUBDIVISIONS_PER_MEASURE: usize = 16;
pub const SUBDIVISIONS_PER_BEAT: usize = SUBDIVISIONS_PER_MEASURE / BEATS_PER_MEASURE;
pub const MAX_MEASURES: usize = 20;

/// One fret label per string, or nothing.
pub type GridColumn = [Option<String>; STRING_COUNT];

/// How many notes made it onto the grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RenderStats {
    pub mapped: usize,
    /// No string can play the pitch under the tuning and difficulty.
    pub unmapped: usize,
    /// Started after the last rendered measure.
    pub truncated: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TablatureHeader {
    pub tuning: TuningPreset,
    /// Row labels, lowest string first.
    pub string_names: [String; STRING_COUNT],
    pub style: String,
    pub difficulty: Difficulty,
    pub note_count: usize,
}

/// A 2.0 s slice of the grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measure {
    pub index: usize,
    pub start_sec: f32,
    pub columns: Vec<GridColumn>,
}

impl Measure {
    fn empty(index: usize) -> Self {
        Self {
            index,
            start_sec: index as f32 * MEASURE_DURATION_SEC,
            columns: vec![GridColumn::default(); SUBDIVISIONS_PER_MEASURE],
        }
    }

    /// Number of filled cells.
    pub fn filled_cells(&self) -> usize {
        self.columns
            .iter()
            .flat_map(|column| column.iter())
            .filter(|cell| cell.is_some())
            .count()
    }

    /// Renders the six string rows, highest string first.
    ///
    /// Every column is as wide as its widest label so the rows stay aligned.
    pub fn rows(&self, string_names: &[String; STRING_COUNT]) -> Vec<String> {
        let name_width = string_names.iter().map(String::len).max().unwrap_or(1);
        let widths: Vec<usize> = self
            .columns
            .iter()
            .map(|column| {
                column
                    .iter()
                    .flatten()
                    .map(String::len)
                    .max()
                    .unwrap_or(1)
            })
            .collect();

        (0..STRING_COUNT)
            .rev()
            .map(|string_index| {
                let mut row = format!(
                    "{:<width$}|",
                    string_names[string_index],
                    width = name_width
                );
                for (subdivision, (column, &width)) in
                    self.columns.iter().zip(&widths).enumerate()
                {
                    if subdivision > 0 && subdivision % SUBDIVISIONS_PER_BEAT == 0 {
                        row.push('|');
                    }
                    let cell = column[string_index].as_deref().unwrap_or("");
                    row.push_str(cell);
                    row.push_str(&"-".repeat(width - cell.len()));
                }
                row.push('|');
                row
            })
            .collect()
    }
}

/// Rendered tablature for a whole run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tablature {
    pub header: TablatureHeader,
    pub measures: Vec<Measure>,
    pub stats: RenderStats,
}

impl Tablature {
    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Tablature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = &self.header;
        writeln!(
            f,
            "Tuning: {} ({})",
            header.tuning.display_name(),
            header.string_names.join(" ")
        )?;
        writeln!(f, "Style: {}", header.style)?;
        writeln!(
            f,
            "Difficulty: {} (max fret {})",
            header.difficulty,
            header.difficulty.max_fret()
        )?;
        writeln!(f, "Notes: {}", header.note_count)?;

        for measure in &self.measures {
            writeln!(f)?;
            writeln!(f, "Measure {}", measure.index + 1)?;
            for row in measure.rows(&header.string_names) {
                writeln!(f, "{row}")?;
            }
        }
        Ok(())
    }
}

/// Renders notes for one tuning, difficulty and style.
#[derive(Debug, Clone)]
pub struct TablatureRenderer {
    tuning: TuningPreset,
    difficulty: Difficulty,
    style: String,
}

impl TablatureRenderer {
    pub fn new(tuning: TuningPreset, difficulty: Difficulty, style: impl Into<String>) -> Self {
        Self {
            tuning,
            difficulty,
            style: style.into(),
        }
    }

    pub fn from_config(config: &TranscriptionConfig) -> Self {
        Self::new(config.tuning, config.difficulty, config.style.clone())
    }

    /// Places `notes` (merged, in time order) on the measure grid.
    ///
    /// Always renders at least one measure, so an empty input still produces
    /// a header and a blank grid.
    pub fn render(&self, notes: &[Note]) -> Tablature {
        let tuning = self.tuning.tuning();
        let max_fret = self.difficulty.max_fret();

        let last_end = notes
            .iter()
            .map(Note::end_time_sec)
            .fold(MEASURE_DURATION_SEC, f32::max);
        let needed = (last_end / MEASURE_DURATION_SEC).ceil() as usize;
        let measure_count = needed.clamp(1, MAX_MEASURES);

        let mut measures: Vec<Measure> = (0..measure_count).map(Measure::empty).collect();
        let mut stats = RenderStats::default();

        for note in notes {
            let position_in_song = note.start_time_sec.max(0.0) / MEASURE_DURATION_SEC;
            let measure_index = position_in_song.floor() as usize;
            let Some(measure) = measures.get_mut(measure_index) else {
                stats.truncated += 1;
                continue;
            };

            let Some(position) = map_pitch(note.midi_note(), &tuning, max_fret) else {
                stats.unmapped += 1;
                continue;
            };

            let offset = (note.start_time_sec - measure.start_sec) / MEASURE_DURATION_SEC;
            let subdivision = ((offset * SUBDIVISIONS_PER_MEASURE as f32).floor() as usize)
                .min(SUBDIVISIONS_PER_MEASURE - 1);
            measure.columns[subdivision][position.string_index] = Some(position.label());
            stats.mapped += 1;
        }

        if needed > MAX_MEASURES {
            warn!(
                needed,
                rendered = MAX_MEASURES,
                truncated = stats.truncated,
                "Tablature truncated"
            );
        }
        debug!(
            measures = measure_count,
            mapped = stats.mapped,
            unmapped = stats.unmapped,
            "Rendered tablature"
        );

        Tablature {
            header: TablatureHeader {
                tuning: self.tuning,
                string_names: tuning.string_names(),
                style: self.style.clone(),
                difficulty: self.difficulty,
                note_count: notes.len(),
            },
            measures,
            stats,
        }
    }
}

/// Convenience wrapper around `TablatureRenderer::from_config(config).render(notes)`.
pub fn render_tablature(notes: &[Note], config: &TranscriptionConfig) -> Tablature {
    TablatureRenderer::from_config(config).render(notes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(midi_pitch: f32, start_time_sec: f32, duration_sec: f32) -> Note {
        Note {
            midi_pitch,
            frequency_hz: crate::tuning::midi_to_frequency(midi_pitch),
            start_time_sec,
            duration_sec,
            velocity: 0.5,
        }
    }

    fn renderer() -> TablatureRenderer {
        TablatureRenderer::new(TuningPreset::Standard, Difficulty::Intermediate, "rock")
    }

    #[test]
    fn test_empty_input_renders_one_blank_measure() {
        let tab = renderer().render(&[]);
        assert_eq!(tab.measures.len(), 1);
        assert_eq!(tab.measures[0].filled_cells(), 0);
        assert_eq!(tab.header.note_count, 0);

        let text = tab.to_text();
        assert!(text.starts_with("Tuning: Standard (E A D G B e)\n"));
        assert!(text.contains("Style: rock\n"));
        assert!(text.contains("Difficulty: intermediate (max fret 12)\n"));
        assert!(text.contains("Notes: 0\n"));
        assert!(text.contains("e|----|----|----|----|\n"));
        assert!(text.contains("E|----|----|----|----|\n"));
    }

    #[test]
    fn test_two_notes_in_first_measure() {
        let notes = [note(64.0, 0.0, 0.95), note(67.0, 1.0, 0.95)];
        let tab = renderer().render(&notes);

        assert_eq!(tab.measures.len(), 1);
        assert_eq!(tab.stats, RenderStats { mapped: 2, unmapped: 0, truncated: 0 });
        let measure = &tab.measures[0];
        assert_eq!(measure.columns[0][4].as_deref(), Some("5"));
        assert_eq!(measure.columns[8][4].as_deref(), Some("8"));

        let rows = measure.rows(&tab.header.string_names);
        assert_eq!(rows[0], "e|----|----|----|----|");
        assert_eq!(rows[1], "B|5---|----|8---|----|");
        assert_eq!(rows[5], "E|----|----|----|----|");
    }

    #[test]
    fn test_double_digit_frets_keep_rows_aligned() {
        // A4 on intermediate: B string fret 10
        let tab = renderer().render(&[note(69.0, 0.5, 0.2)]);
        let rows = tab.measures[0].rows(&tab.header.string_names);
        assert_eq!(rows[1], "B|----|(10)---|----|----|");
        assert_eq!(rows[0], "e|----|-------|----|----|");
        assert!(rows.iter().all(|row| row.len() == rows[0].len()));
    }

    #[test]
    fn test_unplayable_notes_are_counted() {
        let beginner =
            TablatureRenderer::new(TuningPreset::Standard, Difficulty::Beginner, "blues");
        // D#2 is below the open low E
        let tab = beginner.render(&[note(39.0, 0.0, 0.5), note(45.0, 0.5, 0.5)]);
        assert_eq!(tab.stats.unmapped, 1);
        assert_eq!(tab.stats.mapped, 1);
        assert_eq!(tab.header.note_count, 2);
        assert_eq!(tab.measures[0].filled_cells(), 1);
    }

    #[test]
    fn test_measure_count_and_cap() {
        let tab = renderer().render(&[note(64.0, 2.5, 2.0)]);
        // ends at 4.5s -> three measures
        assert_eq!(tab.measures.len(), 3);
        assert_eq!(tab.measures[1].filled_cells(), 1);

        let notes: Vec<Note> = (0..30).map(|i| note(64.0, i as f32 * 2.0, 1.0)).collect();
        let tab = renderer().render(&notes);
        assert_eq!(tab.measures.len(), MAX_MEASURES);
        assert_eq!(tab.stats.mapped, MAX_MEASURES);
        assert_eq!(tab.stats.truncated, 10);
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let notes = [note(52.0, 0.1, 0.3), note(57.0, 0.7, 0.3), note(76.0, 2.2, 0.4)];
        let first = renderer().render(&notes).to_text();
        let second = renderer().render(&notes).to_text();
        assert_eq!(first, second);
        assert!(first.contains("Measure 2\n"));
    }

    #[test]
    fn test_alternate_tuning_labels() {
        let tab = TablatureRenderer::new(TuningPreset::DropD, Difficulty::Advanced, "metal")
            .render(&[note(38.0, 0.0, 0.5)]);
        let rows = tab.measures[0].rows(&tab.header.string_names);
        assert_eq!(rows[5], "D|0---|----|----|----|");
        assert!(tab.to_text().starts_with("Tuning: Drop D (D A D G B e)\n"));
    }
}
