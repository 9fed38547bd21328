//! Coalescing of consecutive note candidates that belong to one sustained
//! pitch.

use crate::note::Note;

/// Notes closer than this in pitch (semitones) can be merged.
pub const MERGE_PITCH_SEMITONES: f32 = 1.0;

/// Largest silence (seconds) allowed between two merged notes.
pub const MERGE_GAP_SEC: f32 = 0.1;

/// Merges adjacent notes of the same pitch separated by a short gap.
///
/// The first note of each run is kept and its duration is stretched to the
/// end of the last note in the run. Applying the merge to its own output
/// changes nothing.
pub fn merge_notes(notes: &[Note]) -> Vec<Note> {
    let mut merged = Vec::with_capacity(notes.len());
    let Some((first, rest)) = notes.split_first() else {
        return merged;
    };

    let mut current = *first;
    for note in rest {
        let same_pitch = (note.midi_pitch - current.midi_pitch).abs() < MERGE_PITCH_SEMITONES;
        let gap = note.start_time_sec - current.end_time_sec();
        if same_pitch && gap < MERGE_GAP_SEC {
            let end = note.end_time_sec().max(current.end_time_sec());
            current.duration_sec = end - current.start_time_sec;
        } else {
            merged.push(current);
            current = *note;
        }
    }
    merged.push(current);
    merged
}
