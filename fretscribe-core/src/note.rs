use serde::{Deserialize, Serialize};

use crate::tuning;

/// A single detected note.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub midi_pitch: f32,     // MIDI pitch, integral once emitted by the detector
    pub frequency_hz: f32,   // The measured fundamental in Hz
    pub start_time_sec: f32,
    pub duration_sec: f32,
    pub velocity: f32,       // 0.0 to 1.0, derived from window energy
}

impl Note {
    pub fn end_time_sec(&self) -> f32 {
        self.start_time_sec + self.duration_sec
    }

    /// Nearest integer MIDI pitch.
    pub fn midi_note(&self) -> i32 {
        self.midi_pitch.round() as i32
    }

    /// Pitch class 0..=11 (0 = C).
    pub fn pitch_class(&self) -> usize {
        self.midi_note().rem_euclid(12) as usize
    }

    pub fn name(&self) -> String {
        tuning::note_name(self.midi_note())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_helpers() {
        let note = Note {
            midi_pitch: 63.6,
            frequency_hz: 329.0,
            start_time_sec: 1.0,
            duration_sec: 0.5,
            velocity: 0.8,
        };
        assert_eq!(note.midi_note(), 64);
        assert_eq!(note.pitch_class(), 4);
        assert_eq!(note.name(), "E4");
        assert!((note.end_time_sec() - 1.5).abs() < 1e-6);
    }
}
