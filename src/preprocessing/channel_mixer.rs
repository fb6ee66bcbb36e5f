//! Channel mixing and band splitting
//!
//! The onset envelope is built from two views of the mono mix: a bass band
//! (one-pole low-pass) and the residual above it.

/// Average all channels into one mono signal
///
/// # Arguments
///
/// * `channels` - Planar channel data, all of the same length
///
/// # Returns
///
/// Mono samples (empty if there are no channels)
pub fn mix_to_mono(channels: &[Vec<f32>]) -> Vec<f32> {
    let Some(first) = channels.first() else {
        return Vec::new();
    };

    let scale = 1.0 / channels.len() as f32;
    let mut mono = first.clone();
    for channel in &channels[1..] {
        for (acc, &sample) in mono.iter_mut().zip(channel) {
            *acc += sample;
        }
    }
    for sample in &mut mono {
        *sample *= scale;
    }

    mono
}

/// Smoothing coefficient of a one-pole low-pass at `cutoff_hz`
///
/// `alpha = 1 - exp(-2π·fc / fs)`
pub fn one_pole_alpha(cutoff_hz: f32, sample_rate: u32) -> f32 {
    1.0 - (-2.0 * std::f32::consts::PI * cutoff_hz / sample_rate as f32).exp()
}

/// Run a one-pole IIR low-pass over `signal`
///
/// `y[n] = y[n-1] + alpha · (x[n] - y[n-1])`, starting from a zero state.
pub fn lowpass(signal: &[f32], alpha: f32) -> Vec<f32> {
    let mut state = 0.0f32;
    signal
        .iter()
        .map(|&x| {
            state += alpha * (x - state);
            state
        })
        .collect()
}

/// Split the mono mix into `(bass, high)` bands
///
/// `high` is the residual `mono - bass`, so the two bands always sum back to
/// the input.
pub fn split_bands(mono: &[f32], sample_rate: u32, cutoff_hz: f32) -> (Vec<f32>, Vec<f32>) {
    let bass = lowpass(mono, one_pole_alpha(cutoff_hz, sample_rate));
    let high = mono.iter().zip(&bass).map(|(&m, &b)| m - b).collect();
    log::debug!(
        "Split {} samples at {:.0} Hz into bass/high bands",
        mono.len(),
        cutoff_hz
    );
    (bass, high)
}
