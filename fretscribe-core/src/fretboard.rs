//! # Fretboard Mapping Module
//!
//! Chooses where on the neck a pitch is played.
//!
//! A pitch can usually be fretted on several strings. The mapper prefers the
//! three middle strings (indices 2, 3 and 4) because they can move to a
//! neighbouring string in either direction; otherwise it falls back to the
//! highest string that can reach the pitch.

use serde::{Deserialize, Serialize};

use crate::tuning::{STRING_COUNT, Tuning};

/// Strings preferred by the mapper, by index (0 = lowest string).
const MIDDLE_STRINGS: std::ops::RangeInclusive<usize> = 2..=4;

/// A (string, fret) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FretPosition {
    pub string_index: usize,
    pub fret: u8,
}

impl FretPosition {
    /// Tablature label: bare digits below fret 10, parenthesized above.
    pub fn label(&self) -> String {
        if self.fret < 10 {
            self.fret.to_string()
        } else {
            format!("({})", self.fret)
        }
    }
}

/// Every position that plays `pitch` within `max_fret`, scanning from the
/// highest string down to the lowest.
pub fn candidate_positions(pitch: i32, tuning: &Tuning, max_fret: u8) -> Vec<FretPosition> {
    (0..STRING_COUNT)
        .rev()
        .filter_map(|string_index| {
            let fret = pitch - tuning.open_string(string_index) as i32;
            (0..=max_fret as i32).contains(&fret).then(|| FretPosition {
                string_index,
                fret: fret as u8,
            })
        })
        .collect()
}

/// Picks a single position for `pitch`.
///
/// # Arguments
/// * `pitch` - MIDI pitch
/// * `tuning` - Open-string pitches
/// * `max_fret` - Highest fret allowed by the difficulty level
///
/// # Returns
/// * `Some(position)` - First middle-string candidate, or else the first
///   candidate from the highest string down
/// * `None` - The pitch is unplayable with this tuning and fret limit
pub fn map_pitch(pitch: i32, tuning: &Tuning, max_fret: u8) -> Option<FretPosition> {
    let candidates = candidate_positions(pitch, tuning, max_fret);
    candidates
        .iter()
        .find(|position| MIDDLE_STRINGS.contains(&position.string_index))
        .or_else(|| candidates.first())
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::{Difficulty, TuningPreset};

    #[test]
    fn test_prefers_middle_strings() {
        let standard = TuningPreset::Standard.tuning();
        // E4: open high e, B string fret 5, G string fret 9
        assert_eq!(
            map_pitch(64, &standard, 12),
            Some(FretPosition { string_index: 4, fret: 5 })
        );
        // G4: high e fret 3, B string fret 8
        assert_eq!(
            map_pitch(67, &standard, 12),
            Some(FretPosition { string_index: 4, fret: 8 })
        );
    }

    #[test]
    fn test_falls_back_to_outer_strings() {
        let standard = TuningPreset::Standard.tuning();
        // Low E only reachable on string 0
        assert_eq!(
            map_pitch(40, &standard, 5),
            Some(FretPosition { string_index: 0, fret: 0 })
        );
        // A high note only the high e string reaches under the beginner limit
        assert_eq!(
            map_pitch(68, &standard, 5),
            Some(FretPosition { string_index: 5, fret: 4 })
        );
    }

    #[test]
    fn test_unplayable() {
        let standard = TuningPreset::Standard.tuning();
        assert_eq!(map_pitch(39, &standard, 17), None);
        assert_eq!(map_pitch(82, &standard, 12), None);
        assert_eq!(
            map_pitch(36, &TuningPreset::DropC.tuning(), 5),
            Some(FretPosition {
                string_index: 0,
                fret: 0
            })
        );
    }

    #[test]
    fn test_mapped_positions_reproduce_pitch() {
        for preset in TuningPreset::ALL {
            let tuning = preset.tuning();
            for difficulty in Difficulty::ALL {
                let max_fret = difficulty.max_fret();
                for pitch in 30..100 {
                    let candidates = candidate_positions(pitch, &tuning, max_fret);
                    let Some(position) = map_pitch(pitch, &tuning, max_fret) else {
                        assert!(candidates.is_empty());
                        continue;
                    };
                    assert_eq!(
                        tuning.open_string(position.string_index) as i32 + position.fret as i32,
                        pitch
                    );
                    assert!(position.fret <= max_fret);

                    let middle_available = candidates
                        .iter()
                        .any(|c| (2..=4).contains(&c.string_index));
                    if middle_available {
                        assert!((2..=4).contains(&position.string_index));
                    }
                }
            }
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(FretPosition { string_index: 0, fret: 7 }.label(), "7");
        assert_eq!(FretPosition { string_index: 0, fret: 12 }.label(), "(12)");
    }
}
