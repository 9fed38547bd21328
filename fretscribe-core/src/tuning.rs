//! # Guitar Tuning Module
//!
//! This module provides the read-only tables the pipeline looks things up in:
//! the built-in six-string tunings, the difficulty levels that bound how far
//! up the neck a note may be placed, and the pitch naming helpers.
//!
//! ## Features
//! - Tuning catalog (standard, drop D, half step down, full step down, drop C)
//! - Name lookups that reject unknown names with a `ConfigError`
//! - Difficulty to maximum-fret mapping
//! - MIDI / frequency / note-name conversions (A4 = 440 Hz = MIDI 69)

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Pitch-class names, indexed by `midi % 12`.
pub const PITCH_CLASS_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Number of strings on the instrument.
pub const STRING_COUNT: usize = 6;

/// Open-string MIDI pitches, index 0 = lowest (thickest) string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tuning {
    pub strings: [u8; STRING_COUNT],
}

impl Tuning {
    pub const fn new(strings: [u8; STRING_COUNT]) -> Self {
        Self { strings }
    }

    /// MIDI pitch of the open string at `string_index`.
    pub fn open_string(&self, string_index: usize) -> u8 {
        self.strings[string_index]
    }

    /// Row labels for the tablature, lowest string first.
    ///
    /// The highest string is written in lowercase so that standard tuning
    /// reads `E A D G B e`.
    pub fn string_names(&self) -> [String; STRING_COUNT] {
        std::array::from_fn(|i| {
            let name = pitch_class_name(self.strings[i] as i32);
            if i == STRING_COUNT - 1 {
                name.to_lowercase()
            } else {
                name.to_string()
            }
        })
    }
}

/// The built-in tunings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TuningPreset {
    #[serde(rename = "standard")]
    Standard,
    #[serde(rename = "dropd")]
    DropD,
    #[serde(rename = "halfdrop")]
    HalfStepDown,
    #[serde(rename = "fulldrop")]
    FullStepDown,
    #[serde(rename = "dropc")]
    DropC,
}

impl TuningPreset {
    pub const ALL: [TuningPreset; 5] = [
        TuningPreset::Standard,
        TuningPreset::DropD,
        TuningPreset::HalfStepDown,
        TuningPreset::FullStepDown,
        TuningPreset::DropC,
    ];

    /// The catalog key used in configuration (`"dropd"`, `"halfdrop"`, ...).
    pub fn key(self) -> &'static str {
        match self {
            TuningPreset::Standard => "standard",
            TuningPreset::DropD => "dropd",
            TuningPreset::HalfStepDown => "halfdrop",
            TuningPreset::FullStepDown => "fulldrop",
            TuningPreset::DropC => "dropc",
        }
    }

    /// Human-readable name for headers.
    pub fn display_name(self) -> &'static str {
        match self {
            TuningPreset::Standard => "Standard",
            TuningPreset::DropD => "Drop D",
            TuningPreset::HalfStepDown => "Half Step Down",
            TuningPreset::FullStepDown => "Full Step Down",
            TuningPreset::DropC => "Drop C",
        }
    }

    pub fn tuning(self) -> Tuning {
        match self {
            TuningPreset::Standard => Tuning::new([40, 45, 50, 55, 59, 64]),
            TuningPreset::DropD => Tuning::new([38, 45, 50, 55, 59, 64]),
            TuningPreset::HalfStepDown => Tuning::new([39, 44, 49, 54, 58, 63]),
            TuningPreset::FullStepDown => Tuning::new([38, 43, 48, 53, 57, 62]),
            TuningPreset::DropC => Tuning::new([36, 43, 48, 53, 57, 62]),
        }
    }
}

impl fmt::Display for TuningPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Static map for tuning name lookups.
static TUNING_MAP: Lazy<BTreeMap<&'static str, TuningPreset>> = Lazy::new(|| {
    TuningPreset::ALL
        .iter()
        .map(|&preset| (preset.key(), preset))
        .collect()
});

impl FromStr for TuningPreset {
    type Err = ConfigError;

    /// Looks a tuning up by its catalog key, ignoring case and surrounding
    /// whitespace.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        TUNING_MAP
            .get(name.trim().to_ascii_lowercase().as_str())
            .copied()
            .ok_or_else(|| ConfigError::UnknownTuning(name.to_string()))
    }
}

/// Player skill level, which caps the highest fret the mapper may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
    ];

    pub fn max_fret(self) -> u8 {
        match self {
            Difficulty::Beginner => 5,
            Difficulty::Intermediate => 12,
            Difficulty::Advanced => 17,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Difficulty {
    type Err = ConfigError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(Difficulty::Beginner),
            "intermediate" => Ok(Difficulty::Intermediate),
            "advanced" => Ok(Difficulty::Advanced),
            _ => Err(ConfigError::UnknownDifficulty(name.to_string())),
        }
    }
}

/// Converts a frequency to a (fractional) MIDI pitch.
pub fn frequency_to_midi(freq: f32) -> f32 {
    12.0 * (freq / 440.0).log2() + 69.0
}

/// Converts a MIDI pitch to its equal-temperament frequency in Hz.
pub fn midi_to_frequency(midi: f32) -> f32 {
    440.0 * 2.0_f32.powf((midi - 69.0) / 12.0)
}

/// Pitch-class name of a MIDI note, e.g. `"C#"` for 61.
pub fn pitch_class_name(midi: i32) -> &'static str {
    PITCH_CLASS_NAMES[midi.rem_euclid(12) as usize]
}

/// Full note name with octave, e.g. `"E2"` for 40 or `"A4"` for 69.
pub fn note_name(midi: i32) -> String {
    // MIDI 60 is C4, so octaves change at C.
    let octave = midi.div_euclid(12) - 1;
    format!("{}{}", pitch_class_name(midi), octave)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_values() {
        assert_eq!(TuningPreset::Standard.tuning().strings, [40, 45, 50, 55, 59, 64]);
        assert_eq!(TuningPreset::DropD.tuning().strings, [38, 45, 50, 55, 59, 64]);
        assert_eq!(TuningPreset::HalfStepDown.tuning().strings, [39, 44, 49, 54, 58, 63]);
        assert_eq!(TuningPreset::FullStepDown.tuning().strings, [38, 43, 48, 53, 57, 62]);
        assert_eq!(TuningPreset::DropC.tuning().strings, [36, 43, 48, 53, 57, 62]);
    }

    #[test]
    fn test_tuning_lookup() {
        assert_eq!("standard".parse::<TuningPreset>(), Ok(TuningPreset::Standard));
        assert_eq!(" DropD ".parse::<TuningPreset>(), Ok(TuningPreset::DropD));
        assert_eq!("halfdrop".parse::<TuningPreset>(), Ok(TuningPreset::HalfStepDown));
        assert_eq!(
            "open-g".parse::<TuningPreset>(),
            Err(ConfigError::UnknownTuning("open-g".to_string()))
        );
        for preset in TuningPreset::ALL {
            assert_eq!(preset.key().parse::<TuningPreset>(), Ok(preset));
        }
    }

    #[test]
    fn test_difficulty_lookup() {
        assert_eq!("beginner".parse::<Difficulty>().map(Difficulty::max_fret), Ok(5));
        assert_eq!("Intermediate".parse::<Difficulty>().map(Difficulty::max_fret), Ok(12));
        assert_eq!("advanced".parse::<Difficulty>().map(Difficulty::max_fret), Ok(17));
        assert!(matches!(
            "expert".parse::<Difficulty>(),
            Err(ConfigError::UnknownDifficulty(_))
        ));
    }

    #[test]
    fn test_string_names() {
        assert_eq!(
            TuningPreset::Standard.tuning().string_names(),
            ["E", "A", "D", "G", "B", "e"].map(String::from)
        );
        assert_eq!(TuningPreset::DropC.tuning().string_names()[0], "C");
        assert_eq!(TuningPreset::HalfStepDown.tuning().string_names()[5], "d#");
    }

    #[test]
    fn test_note_names_and_conversions() {
        assert_eq!(note_name(69), "A4");
        assert_eq!(note_name(40), "E2");
        assert_eq!(note_name(60), "C4");
        assert_eq!(pitch_class_name(-1), "B");
        assert!((frequency_to_midi(440.0) - 69.0).abs() < 1e-4);
        assert!((frequency_to_midi(82.41) - 40.0).abs() < 0.01);
        assert!((midi_to_frequency(64.0) - 329.63).abs() < 0.01);
    }

    #[test]
    fn test_serde_names_match_catalog_keys() {
        for preset in TuningPreset::ALL {
            let json = serde_json::to_string(&preset).unwrap();
            assert_eq!(json, format!("\"{}\"", preset.key()));
        }
        let difficulty: Difficulty = serde_json::from_str("\"advanced\"").unwrap();
        assert_eq!(difficulty, Difficulty::Advanced);
    }
}
