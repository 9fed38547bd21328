//! WAV decoding into a mono `SampleBuffer`.

use anyhow::{Context, Result};
use fretscribe_core::SampleBuffer;
use hound::{SampleFormat, WavReader};
use std::path::Path;
use tracing::debug;

/// Reads a WAV file, keeping the first channel and scaling integer samples
/// to [-1, 1].
pub fn read_wav(path: &Path) -> Result<SampleBuffer> {
    let mut reader = WavReader::open(path)
        .with_context(|| format!("Failed to open WAV file {}", path.display()))?;
    let spec = reader.spec();
    debug!(
        channels = spec.channels,
        sample_rate = spec.sample_rate,
        bits = spec.bits_per_sample,
        "Decoding WAV"
    );

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .context("Failed to decode float samples")?,
        SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.max(1) - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|sample| sample.map(|s| s as f32 / scale))
                .collect::<Result<_, _>>()
                .context("Failed to decode integer samples")?
        }
    };

    let buffer =
        SampleBuffer::from_interleaved(&interleaved, spec.channels as usize, spec.sample_rate)?;
    Ok(buffer)
}
