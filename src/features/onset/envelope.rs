//! Onset strength envelope
//!
//! Turns raw multi-channel PCM into a per-frame onset-strength series.
//!
//! Algorithm:
//! 1. Mix to mono and split into a bass band (one-pole low-pass, ~200 Hz) and
//!    the residual high band
//! 2. Per frame: bass energy = Σ|bass|, high flux = Σ|Δhigh|
//! 3. Feature = (0.6·bass + 0.4·flux) / frame_size
//! 4. Onset strength = positive first difference of the feature
//! 5. Detrend: subtract 0.9 × local mean over ±16 frames, clamp at 0
//! 6. Standardize by global mean / std (population), clamp at 0
//!
//! Bass energy catches kick drums; the high-band flux catches hi-hat and snare
//! attacks that barely move the low end.
//!
//! # Example
//!
//! ```no_run
//! use beatlane::features::onset::envelope::build_onset_envelope;
//! use beatlane::{AnalysisConfig, AudioSamples};
//!
//! let samples = AudioSamples::from_mono(vec![0.0f32; 44100 * 30], 44100)?;
//! let envelope = build_onset_envelope(&samples, &AnalysisConfig::default());
//! println!("{} frames at {:.1} fps", envelope.len(), envelope.frame_rate);
//! # Ok::<(), beatlane::AnalysisError>(())
//! ```

use super::OnsetEnvelope;
use crate::config::AnalysisConfig;
use crate::io::AudioSamples;
use crate::preprocessing::channel_mixer::{mix_to_mono, split_bands};

/// Standard deviations below this are treated as a flat envelope
const STD_EPSILON: f32 = 1e-6;

/// Weight of the bass energy in the frame feature
const BASS_WEIGHT: f32 = 0.6;

/// Weight of the high-band flux in the frame feature
const FLUX_WEIGHT: f32 = 0.4;

/// Build the normalized onset envelope for a decoded recording
///
/// # Arguments
///
/// * `samples` - Decoded planar audio
/// * `config` - Frame/hop sizes, bass cutoff and detrend parameters
///
/// # Returns
///
/// `OnsetEnvelope` with one value per hop. Empty when the input is shorter
/// than one frame, has no channels, or yields fewer than three frames.
///
/// # Performance
///
/// Linear in the number of samples; the detrend window uses prefix sums.
pub fn build_onset_envelope(samples: &AudioSamples, config: &AnalysisConfig) -> OnsetEnvelope {
    let frame_size = config.frame_size;
    let hop_size = config.hop_size.max(1);
    let frame_rate = samples.sample_rate() as f32 / hop_size as f32;

    if frame_size == 0 || samples.channel_count() == 0 || samples.len() < frame_size {
        log::warn!(
            "Audio too short for onset analysis ({} samples, {} channels, frame={})",
            samples.len(),
            samples.channel_count(),
            frame_size
        );
        return OnsetEnvelope::empty(frame_rate);
    }

    log::debug!(
        "Building onset envelope: {} samples x {} channels, frame={}, hop={}",
        samples.len(),
        samples.channel_count(),
        frame_size,
        hop_size
    );

    let mono = mix_to_mono(samples.channels());
    let (bass, high) = split_bands(&mono, samples.sample_rate(), config.bass_cutoff_hz);

    let feature = frame_features(&bass, &high, frame_size, hop_size);
    if feature.len() < 3 {
        return OnsetEnvelope::empty(frame_rate);
    }

    let strength = positive_difference(&feature);
    let detrended = detrend(&strength, config.detrend_window, config.detrend_factor);
    let values = standardize(&detrended);

    log::debug!("Onset envelope: {} frames at {:.2} fps", values.len(), frame_rate);

    OnsetEnvelope { values, frame_rate }
}

/// Per-frame weighted bass energy + high-band flux
fn frame_features(bass: &[f32], high: &[f32], frame_size: usize, hop_size: usize) -> Vec<f32> {
    let length = bass.len();
    let num_frames = (length - frame_size) / hop_size + 1;
    let mut feature = Vec::with_capacity(num_frames);

    for frame in 0..num_frames {
        let start = frame * hop_size;
        let end = start + frame_size;

        let bass_energy: f32 = bass[start..end].iter().map(|x| x.abs()).sum();

        let mut previous = if start > 0 { high[start - 1] } else { 0.0 };
        let mut high_flux = 0.0f32;
        for &sample in &high[start..end] {
            high_flux += (sample - previous).abs();
            previous = sample;
        }

        feature.push((BASS_WEIGHT * bass_energy + FLUX_WEIGHT * high_flux) / frame_size as f32);
    }

    feature
}

/// `s[0] = 0`, `s[n] = max(0, f[n] - f[n-1])`
fn positive_difference(feature: &[f32]) -> Vec<f32> {
    let mut strength = Vec::with_capacity(feature.len());
    strength.push(0.0);
    strength.extend(feature.windows(2).map(|w| (w[1] - w[0]).max(0.0)));
    strength
}

/// Subtract `factor` × the local mean over `[i - window, i + window]`
fn detrend(strength: &[f32], window: usize, factor: f32) -> Vec<f32> {
    let mut prefix = Vec::with_capacity(strength.len() + 1);
    prefix.push(0.0f64);
    for &value in strength {
        let last = prefix[prefix.len() - 1];
        prefix.push(last + value as f64);
    }

    let last_index = strength.len() - 1;
    strength
        .iter()
        .enumerate()
        .map(|(i, &value)| {
            let from = i.saturating_sub(window);
            let to = (i + window).min(last_index);
            let local_mean = (prefix[to + 1] - prefix[from]) / (to - from + 1) as f64;
            (value - local_mean as f32 * factor).max(0.0)
        })
        .collect()
}

/// Z-score with population statistics, rectified
fn standardize(values: &[f32]) -> Vec<f32> {
    let n = values.len() as f32;
    let mean = values.iter().sum::<f32>() / n;
    let variance = values.iter().map(|&v| (v - mean) * (v - mean)).sum::<f32>() / n;
    let std = variance.sqrt();

    if std <= STD_EPSILON {
        return vec![0.0; values.len()];
    }

    values.iter().map(|&v| ((v - mean) / std).max(0.0)).collect()
}
