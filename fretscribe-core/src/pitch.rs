//! # Pitch Estimation Module
//!
//! This module estimates the fundamental frequency of a single window of
//! audio using time-domain autocorrelation. It targets monophonic guitar
//! lines: one pitch per window, no polyphony.
//!
//! ## Features
//! - Autocorrelation over the raw samples, normalized by overlap length
//! - Fundamental selection that avoids period multiples
//! - Parabolic interpolation for sub-sample accuracy

/// Lowest frequency searched by the note detector (just below low E, 82.4 Hz).
pub const GUITAR_MIN_FREQ: f32 = 82.0;

/// Highest frequency searched by the note detector (~E6).
pub const GUITAR_MAX_FREQ: f32 = 1320.0;

/// Minimum sum of products at the best lag for a window to count as pitched.
pub const CORRELATION_THRESHOLD: f32 = 0.01;

/// A later correlation peak only replaces an earlier one when the earlier one
/// is weaker than this fraction of the strongest peak.
const PEAK_RATIO: f32 = 0.9;

/// Estimates the fundamental frequency of `signal` by autocorrelation.
///
/// Every candidate period `p` in `[floor(sr / max_freq), floor(sr / min_freq))`
/// is scored with the mean of `signal[i] * signal[i + p]` over the overlapping
/// samples. No window function is applied. The window is unpitched when the
/// plain sum of products at the best lag falls below `CORRELATION_THRESHOLD`.
/// Otherwise the earliest correlation peak that
/// reaches 90% of the strongest score is taken as the period, which keeps the
/// estimate on the fundamental rather than on one of its multiples.
///
/// # Arguments
/// * `signal` - Input audio window
/// * `sample_rate` - Sample rate in Hz
/// * `min_freq` - Lowest frequency to search, in Hz
/// * `max_freq` - Highest frequency to search, in Hz
///
/// # Returns
/// * `Some(frequency)` - Estimated fundamental in Hz
/// * `None` - No lag could be tried, or the best sum of products is below
///   `CORRELATION_THRESHOLD`
pub fn estimate_pitch(
    signal: &[f32],
    sample_rate: u32,
    min_freq: f32,
    max_freq: f32,
) -> Option<f32> {
    let n = signal.len();
    if n < 2 || min_freq <= 0.0 || max_freq <= min_freq {
        return None;
    }

    let sr = sample_rate as f32;
    let min_lag = ((sr / max_freq).floor() as usize).max(1);
    // Lags must leave at least one overlapping sample.
    let max_lag = ((sr / min_freq).floor() as usize).min(n - 1);
    if min_lag >= max_lag {
        return None;
    }

    // One extra lag on each side so the range edges can be tested as peaks.
    let first = min_lag.saturating_sub(1).max(1);
    let last = (max_lag + 1).min(n - 1);
    let scores: Vec<f32> = (first..last).map(|lag| correlation(signal, lag)).collect();
    let score = |lag: usize| scores[lag - first];

    let (best_lag, best) = (min_lag..max_lag)
        .map(|lag| (lag, score(lag)))
        .fold((min_lag, f32::NEG_INFINITY), |acc, (lag, value)| {
            if value > acc.1 { (lag, value) } else { acc }
        });
    // Scores are means; the threshold applies to the plain sum.
    let best_sum = best * (n - best_lag) as f32;
    if !best_sum.is_finite() || best_sum < CORRELATION_THRESHOLD {
        return None;
    }

    let is_peak = |lag: usize| {
        lag > first && lag + 1 < last && score(lag) > score(lag - 1) && score(lag) >= score(lag + 1)
    };

    let period = (min_lag..max_lag)
        .find(|&lag| is_peak(lag) && score(lag) >= PEAK_RATIO * best)
        .map(|lag| interpolate_peak(score(lag - 1), score(lag), score(lag + 1), lag))
        // No interior peak: fall back to the plain maximum.
        .unwrap_or(best_lag as f32);

    let frequency = sr / period;
    if frequency.is_finite() && frequency > 0.0 {
        Some(frequency)
    } else {
        None
    }
}

/// Mean product of the signal with itself shifted by `lag` samples.
fn correlation(signal: &[f32], lag: usize) -> f32 {
    let overlap = signal.len() - lag;
    let sum: f32 = signal[..overlap]
        .iter()
        .zip(&signal[lag..])
        .map(|(a, b)| a * b)
        .sum();
    sum / overlap as f32
}

/// Fits a parabola through three correlation scores around `lag` and returns
/// the fractional position of its vertex.
fn interpolate_peak(y1: f32, y2: f32, y3: f32, lag: usize) -> f32 {
    let denominator = y1 - 2.0 * y2 + y3;
    if denominator.abs() < f32::EPSILON {
        return lag as f32;
    }
    let shift = 0.5 * (y1 - y3) / denominator;
    // Anything further than half a sample means the neighbours are unreliable.
    if shift.abs() > 0.5 {
        lag as f32
    } else {
        lag as f32 + shift
    }
}
