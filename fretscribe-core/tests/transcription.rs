//! End-to-end transcription of synthesized guitar-range tones.

use fretscribe_core::merge::merge_notes;
use fretscribe_core::tablature::TablatureRenderer;
use fretscribe_core::tuning::midi_to_frequency;
use fretscribe_core::{
    DetectionMode, Difficulty, Note, SampleBuffer, TranscriptionConfig, TuningPreset, transcribe,
};

const SAMPLE_RATE: u32 = 44100;

/// Consecutive sine tones, one per (midi pitch, seconds) pair.
fn melody(parts: &[(f32, f32)]) -> SampleBuffer {
    let mut samples = Vec::new();
    for &(midi, seconds) in parts {
        let freq = midi_to_frequency(midi);
        let len = (seconds * SAMPLE_RATE as f32) as usize;
        samples.extend((0..len).map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            0.5 * (2.0 * std::f32::consts::PI * freq * t).sin()
        }));
    }
    SampleBuffer::new(samples, SAMPLE_RATE).unwrap()
}

fn note(midi_pitch: f32, start_time_sec: f32, duration_sec: f32) -> Note {
    Note {
        midi_pitch,
        frequency_hz: midi_to_frequency(midi_pitch),
        start_time_sec,
        duration_sec,
        velocity: 0.8,
    }
}

#[test]
fn two_tones_become_two_notes_on_the_b_string() {
    let buffer = melody(&[(64.0, 0.6), (67.0, 0.6)]);
    let config = TranscriptionConfig {
        dedup_prefilter: false,
        ..TranscriptionConfig::from_names("standard", "intermediate", "test").unwrap()
    };

    let result = transcribe(&buffer, &config).unwrap();

    let pitches: Vec<f32> = result.notes.iter().map(|n| n.midi_pitch).collect();
    assert!(pitches.contains(&64.0), "pitches: {pitches:?}");
    assert!(pitches.contains(&67.0), "pitches: {pitches:?}");
    // Each sustained tone collapses into one long note
    let long_notes = result.notes.iter().filter(|n| n.duration_sec > 0.4).count();
    assert_eq!(long_notes, 2);

    let text = result.tablature.to_text();
    assert!(text.contains("Style: test\n"));
    assert!(text.contains("B|5"), "{text}");
    assert!(text.contains("|8"), "{text}");
    assert!(result.diagnostics.render.mapped >= 2);
    assert_eq!(result.metadata.note_count, result.notes.len());
    assert!((60..=200).contains(&result.metadata.bpm));
}

#[test]
fn silence_transcribes_to_an_empty_grid() {
    let buffer = SampleBuffer::new(vec![0.0; SAMPLE_RATE as usize], SAMPLE_RATE).unwrap();
    let result = transcribe(&buffer, &TranscriptionConfig::default()).unwrap();

    assert!(result.notes.is_empty());
    assert_eq!(result.metadata.bpm, 120);
    assert_eq!(result.metadata.key, "C");
    assert!((result.metadata.duration_sec - 1.0).abs() < 1e-6);
    assert!(result.tablature.to_text().contains("e|----|----|----|----|"));
    assert_eq!(result.diagnostics.detection.silent, buffer.window_count());
}

#[test]
fn parallel_and_sequential_runs_agree() {
    let buffer = melody(&[(45.0, 0.3), (52.0, 0.3), (57.0, 0.3)]);
    let sequential = TranscriptionConfig::default();
    let parallel = TranscriptionConfig {
        detection: DetectionMode::Parallel { workers: 4 },
        ..TranscriptionConfig::default()
    };

    let a = transcribe(&buffer, &sequential).unwrap();
    let b = transcribe(&buffer, &parallel).unwrap();
    assert_eq!(a, b);
}

#[test]
fn merged_scenario_renders_in_first_measure() {
    let renderer = TablatureRenderer::new(TuningPreset::Standard, Difficulty::Intermediate, "rock");

    // Gaps of 0.05s merge
    let close = [
        note(64.0, 0.0, 0.45),
        note(64.0, 0.5, 0.45),
        note(67.0, 1.0, 0.45),
        note(67.0, 1.5, 0.45),
    ];
    let merged = merge_notes(&close);
    assert_eq!(merged.len(), 2);

    let tab = renderer.render(&merged);
    assert_eq!(tab.measures.len(), 1);
    assert_eq!(tab.measures[0].filled_cells(), 2);
    assert_eq!(tab.measures[0].columns[0][4].as_deref(), Some("5"));
    assert_eq!(tab.measures[0].columns[8][4].as_deref(), Some("8"));
    assert_eq!(tab.to_text(), renderer.render(&merged).to_text());

    // Gaps of 0.25s are past the merge window and stay separate
    let spaced = [
        note(64.0, 0.0, 0.25),
        note(64.0, 0.5, 0.25),
        note(67.0, 1.0, 0.25),
        note(67.0, 1.5, 0.25),
    ];
    let unmerged = merge_notes(&spaced);
    assert_eq!(unmerged.len(), 4);
    assert_eq!(renderer.render(&unmerged).measures[0].filled_cells(), 4);
}

#[test]
fn unknown_names_are_configuration_errors() {
    assert!(TranscriptionConfig::from_names("banjo", "beginner", "").is_err());
    assert!(TranscriptionConfig::from_names("standard", "wizard", "").is_err());
}
