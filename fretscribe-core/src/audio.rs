//! # Sample Buffer Module
//!
//! This module holds the decoded audio handed to the pipeline by whatever
//! collaborator produced it (a WAV decoder, a live capture, a test signal).
//! It also defines the sliding-window geometry used by the note detector.
//!
//! ## Features
//! - Mono sample storage with its sample rate
//! - First-channel extraction from interleaved multi-channel data
//! - Window slicing with a fixed size and hop
//! - Mean-square energy for the silence gate

use crate::error::ConfigError;

/// Number of samples analyzed per pitch window.
///
/// At 44.1 kHz this is ~46ms, long enough to hold at least three periods
/// of the low E string (82 Hz).
pub const WINDOW_SIZE: usize = 2048;

/// Distance in samples between the starts of consecutive windows.
pub const HOP_SIZE: usize = 512;

/// A decoded, mono audio signal plus its sample rate.
///
/// The buffer is read-only once built; the pipeline only borrows it.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl SampleBuffer {
    /// Wraps mono samples.
    ///
    /// # Arguments
    /// * `samples` - Amplitudes, nominally in [-1, 1]
    /// * `sample_rate` - Sample rate in Hz
    ///
    /// # Returns
    /// * `Ok(buffer)` - The wrapped signal
    /// * `Err(ConfigError::InvalidSampleRate)` - If `sample_rate` is zero
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Result<Self, ConfigError> {
        if sample_rate == 0 {
            return Err(ConfigError::InvalidSampleRate);
        }
        Ok(Self { samples, sample_rate })
    }

    /// Builds a buffer from interleaved frames, keeping only the first channel.
    pub fn from_interleaved(
        data: &[f32],
        channels: usize,
        sample_rate: u32,
    ) -> Result<Self, ConfigError> {
        let channels = channels.max(1);
        let samples = data.iter().step_by(channels).copied().collect();
        Self::new(samples, sample_rate)
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Total length of the signal in seconds.
    pub fn duration_sec(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }

    /// Number of complete windows in the buffer.
    ///
    /// A trailing window that would run past the end of the signal is not
    /// counted, so buffers shorter than `WINDOW_SIZE` have no windows at all.
    pub fn window_count(&self) -> usize {
        if self.samples.len() < WINDOW_SIZE {
            0
        } else {
            (self.samples.len() - WINDOW_SIZE) / HOP_SIZE + 1
        }
    }

    /// Returns the samples of window `index`.
    ///
    /// # Panics
    /// * If `index >= self.window_count()`
    pub fn window(&self, index: usize) -> &[f32] {
        let start = index * HOP_SIZE;
        &self.samples[start..start + WINDOW_SIZE]
    }

    /// Start time in seconds of window `index`.
    pub fn window_start_sec(&self, index: usize) -> f32 {
        (index * HOP_SIZE) as f32 / self.sample_rate as f32
    }

    /// Duration in seconds covered by one hop.
    pub fn hop_duration_sec(&self) -> f32 {
        HOP_SIZE as f32 / self.sample_rate as f32
    }
}

/// Mean of the squared samples; zero for an empty slice.
pub fn mean_square_energy(signal: &[f32]) -> f32 {
    if signal.is_empty() {
        return 0.0;
    }
    signal.iter().map(|&s| s * s).sum::<f32>() / signal.len() as f32
}
