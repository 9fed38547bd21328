//! # Audio Capture Module
//!
//! This module records a fixed-length take from the default input device
//! using CPAL (Cross-Platform Audio Library) and hands it to the pipeline as
//! a mono `SampleBuffer`.
//!
//! ## Features
//! - Automatic input device and format selection
//! - First-channel extraction for multi-channel devices
//! - Frames streamed from the audio callback over a crossbeam channel

use anyhow::{Context, Result, anyhow};
use cpal::SupportedStreamConfigRange;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::Sender;
use fretscribe_core::SampleBuffer;
use std::time::Duration;
use tracing::{error, info, warn};

/// Number of mono samples per frame sent from the audio callback.
pub const FRAME_SIZE: usize = 2048;

/// Preferred capture rate.
const TARGET_SAMPLE_RATE: u32 = 44100;

/// Records `duration` of audio from the default input device.
///
/// # Returns
/// * `Ok(buffer)` - The recorded take, first channel only
/// * `Err(e)` - If no device is available or the stream cannot be started
pub fn record(duration: Duration) -> Result<SampleBuffer> {
    let (frame_tx, frame_rx) = crossbeam_channel::unbounded::<Vec<f32>>();
    let (stream, sample_rate) = start_audio_capture(frame_tx)?;

    info!("Recording for {:.1}s...", duration.as_secs_f32());
    let deadline = crossbeam_channel::after(duration);
    let mut samples = Vec::with_capacity((duration.as_secs_f32() * sample_rate as f32) as usize);

    loop {
        crossbeam_channel::select! {
            recv(frame_rx) -> msg => match msg {
                Ok(frame) => samples.extend_from_slice(&frame),
                Err(_) => {
                    warn!("Audio channel closed before the take finished");
                    break;
                }
            },
            recv(deadline) -> _ => break,
        }
    }

    if let Err(e) = stream.pause() {
        warn!("Error pausing stream: {}", e);
    }
    drop(stream);

    info!(samples = samples.len(), sample_rate, "Recording finished");
    Ok(SampleBuffer::new(samples, sample_rate)?)
}

/// Starts audio capture from the default input device.
///
/// This function:
/// 1. Selects the default audio input device
/// 2. Picks a 32-bit float configuration near 44.1 kHz
/// 3. Sets up a callback that keeps the first channel and streams it out in
///    `FRAME_SIZE` chunks
///
/// # Arguments
/// * `sender` - Channel sender receiving mono frames
///
/// # Returns
/// * `Ok((stream, sample_rate))` - Audio stream handle and sample rate
/// * `Err(e)` - Error if audio setup fails
pub fn start_audio_capture(sender: Sender<Vec<f32>>) -> Result<(cpal::Stream, u32)> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| anyhow!("No input device available"))?;

    info!("Using audio input device: {}", device.name()?);

    let configs = device
        .supported_input_configs()
        .context("Failed to query input configurations")?
        .collect::<Vec<_>>();
    let supported_config = find_supported_config(configs, TARGET_SAMPLE_RATE)
        .ok_or_else(|| anyhow!("No suitable f32 input format found"))?;

    let rate = TARGET_SAMPLE_RATE.clamp(
        supported_config.min_sample_rate().0,
        supported_config.max_sample_rate().0,
    );
    let config = supported_config.with_sample_rate(cpal::SampleRate(rate));
    let channels = config.channels().max(1) as usize;
    let sample_rate = config.sample_rate().0;
    let config: cpal::StreamConfig = config.into();

    info!(sample_rate, channels, "Selected input format");

    let err_fn = |err| error!("An error occurred on the audio stream: {}", err);

    // Accumulates mono samples between callbacks.
    let mut pending = Vec::with_capacity(FRAME_SIZE * 2);

    let stream = device.build_input_stream(
        &config,
        move |data: &[f32], _: &cpal::InputCallbackInfo| {
            pending.extend(data.iter().step_by(channels));

            while pending.len() >= FRAME_SIZE {
                let frame: Vec<f32> = pending.drain(..FRAME_SIZE).collect();
                // The receiver only goes away once recording is over.
                let _ = sender.send(frame);
            }
        },
        err_fn,
        None,
    )?;

    stream.play()?;

    Ok((stream, sample_rate))
}

/// Finds the best supported input configuration for the target sample rate.
///
/// Only 32-bit float formats qualify. Mono is preferred, then the range
/// closest to `target_rate`.
fn find_supported_config(
    configs: Vec<SupportedStreamConfigRange>,
    target_rate: u32,
) -> Option<SupportedStreamConfigRange> {
    configs
        .into_iter()
        .filter(|c| c.channels() >= 1 && c.sample_format() == cpal::SampleFormat::F32)
        .min_by_key(|c| {
            let contains = (c.min_sample_rate().0..=c.max_sample_rate().0).contains(&target_rate);
            let min_diff = (c.min_sample_rate().0 as i64 - target_rate as i64).abs();
            let max_diff = (c.max_sample_rate().0 as i64 - target_rate as i64).abs();
            let rate_diff = if contains { 0 } else { min_diff.min(max_diff) };
            (c.channels() != 1, rate_diff)
        })
}
