//! Autocorrelation-based tempo estimation
//!
//! Finds the dominant beat period of the onset envelope.
//!
//! # Algorithm
//!
//! 1. Compute the envelope autocorrelation using FFT acceleration:
//!    `ACF = IFFT(|FFT(envelope)|²)`
//! 2. Restrict lags to the BPM search range (70–190 BPM by default)
//! 3. Score each lag as `ACF[lag] · (0.9 + 0.1 · proximity)`, where proximity
//!    rewards BPMs near a coarse guess. The small prior suppresses octave errors
//!    without overriding a clear periodicity.
//! 4. Clarity = relative margin of the best score over the runner-up
//!
//! # Reference
//!
//! Ellis, D. P. W., & Pikrakis, A. (2006). Real-time Beat Induction.
//! *Proceedings of the International Conference on Music Information Retrieval*.
//!
//! # Example
//!
//! ```no_run
//! use beatlane::features::onset::OnsetEnvelope;
//! use beatlane::features::period::autocorrelation::estimate_tempo;
//!
//! let mut values = vec![0.0f32; 500];
//! for i in (0..500).step_by(50) {
//!     values[i] = 1.0;
//! }
//! let envelope = OnsetEnvelope::new(values, 100.0);
//! let tempo = estimate_tempo(&envelope, 110.0, 70.0, 190.0);
//! assert_eq!(tempo.bpm, 120.0);
//! ```

use super::TempoEstimate;
use crate::features::onset::OnsetEnvelope;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

/// Envelopes shorter than this fall back to the coarse guess
const MIN_ENVELOPE_FRAMES: usize = 8;

/// Share of the score that comes from the raw autocorrelation
const RAW_WEIGHT: f32 = 0.9;

/// Share of the score that comes from proximity to the coarse guess
const PRIOR_WEIGHT: f32 = 0.1;

/// ACF values below this fraction of the zero-lag energy are FFT round-off
const ACF_NOISE_FLOOR: f32 = 1e-5;

/// Estimate the global tempo of an onset envelope
///
/// # Arguments
///
/// * `envelope` - Onset envelope
/// * `fallback_bpm` - Coarse tempo guess; used as a soft prior and as the
///   answer when the envelope is too short
/// * `min_bpm` - Slowest tempo considered
/// * `max_bpm` - Fastest tempo considered
///
/// # Returns
///
/// `TempoEstimate` with the best lag (frames), BPM rounded to an integer and
/// clamped to `[min_bpm, max_bpm]`, and clarity in `[0, 1]`.
///
/// # Performance
///
/// O(n log n) via `rustfft`; a few milliseconds for a full-length song.
pub fn estimate_tempo(
    envelope: &OnsetEnvelope,
    fallback_bpm: f32,
    min_bpm: f32,
    max_bpm: f32,
) -> TempoEstimate {
    let frame_rate = envelope.frame_rate;
    let fallback_lag = lag_for_bpm(fallback_bpm, frame_rate);

    if envelope.len() < MIN_ENVELOPE_FRAMES {
        log::debug!(
            "Envelope too short for tempo estimation ({} frames), using fallback {:.1} BPM",
            envelope.len(),
            fallback_bpm
        );
        return TempoEstimate {
            best_lag: fallback_lag,
            bpm: fallback_bpm,
            clarity: 0.0,
        };
    }

    let min_lag = ((60.0 / max_bpm) * frame_rate).floor().max(1.0) as usize;
    let max_lag = (((60.0 / min_bpm) * frame_rate).ceil() as usize).max(min_lag + 1);

    let acf = compute_autocorrelation_fft(&envelope.values);

    log::debug!(
        "Estimating tempo: {} frames at {:.2} fps, lags [{}, {}], prior {:.1} BPM",
        envelope.len(),
        frame_rate,
        min_lag,
        max_lag,
        fallback_bpm
    );

    let mut best_lag = fallback_lag;
    let mut best_score = f32::NEG_INFINITY;
    let mut second_best = f32::NEG_INFINITY;

    for lag in min_lag..=max_lag {
        let ac = acf.get(lag).copied().unwrap_or(0.0);
        let bpm = 60.0 / (lag as f32 / frame_rate);
        let proximity = 1.0 - ((bpm - fallback_bpm).abs() / fallback_bpm).min(1.0);
        let score = ac * (RAW_WEIGHT + proximity * PRIOR_WEIGHT);

        if score > best_score {
            second_best = best_score;
            best_score = score;
            best_lag = lag;
        } else if score > second_best {
            second_best = score;
        }
    }

    let bpm = (60.0 / (best_lag as f32 / frame_rate)).round();
    let clarity = if best_score > 0.0 {
        ((best_score - second_best.max(0.0)) / best_score).clamp(0.0, 1.0)
    } else {
        0.0
    };

    log::debug!(
        "Tempo estimate: lag={} ({:.1} BPM), score={:.4}, runner-up={:.4}, clarity={:.3}",
        best_lag,
        bpm,
        best_score,
        second_best,
        clarity
    );

    TempoEstimate {
        best_lag,
        bpm: bpm.clamp(min_bpm, max_bpm),
        clarity,
    }
}

/// Beat period in frames for a BPM, at least one frame
pub fn lag_for_bpm(bpm: f32, frame_rate: f32) -> usize {
    ((60.0 / bpm) * frame_rate).round().max(1.0) as usize
}

/// Compute autocorrelation using FFT acceleration
///
/// Uses the identity: ACF = IFFT(|FFT(signal)|²), zero-padded to avoid
/// circular wrap-around.
///
/// # Returns
///
/// Unnormalized autocorrelation `ACF[lag] = Σ x[i]·x[i-lag]`, same length as
/// the input, with round-off noise snapped to zero.
fn compute_autocorrelation_fft(signal: &[f32]) -> Vec<f32> {
    let n = signal.len();
    if n == 0 {
        return Vec::new();
    }

    let fft_size = (2 * n).next_power_of_two();

    let mut buffer: Vec<Complex<f32>> = signal.iter().map(|&x| Complex::new(x, 0.0)).collect();
    buffer.resize(fft_size, Complex::new(0.0, 0.0));

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(fft_size);
    fft.process(&mut buffer);

    for x in &mut buffer {
        *x = *x * x.conj();
    }

    let ifft = planner.plan_fft_inverse(fft_size);
    ifft.process(&mut buffer);

    let scale = 1.0 / fft_size as f32;
    let energy = buffer[0].re * scale;
    let floor = energy.abs() * ACF_NOISE_FLOOR;

    buffer[..n]
        .iter()
        .map(|x| {
            let value = x.re * scale;
            if value.abs() <= floor {
                0.0
            } else {
                value
            }
        })
        .collect()
}
