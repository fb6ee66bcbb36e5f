//! Confidence scoring module
//!
//! Rates how far a detected beat grid can be trusted.
//!
//! # Confidence Components
//!
//! 1. **Tempo clarity**: margin of the winning autocorrelation lag (70% weight)
//! 2. **Beat alignment**: how much the envelope at beat frames rises above the
//!    envelope as a whole (30% weight)
//!
//! Grids that fall back to constant tempo get a fixed low score instead.
//!
//! # Example
//!
//! ```
//! use beatlane::analysis::confidence::{compute_beat_alignment_confidence, score_confidence};
//!
//! let mut envelope = vec![0.1f32; 100];
//! for frame in [20, 40, 60, 80] {
//!     envelope[frame] = 5.0;
//! }
//! let alignment = compute_beat_alignment_confidence(&envelope, &[20, 40, 60, 80]);
//! let confidence = score_confidence(true, 0.8, alignment, 0.35);
//! assert!(confidence > 0.8);
//! ```

/// Weight of tempo clarity in the combined score
const CLARITY_WEIGHT: f32 = 0.7;

/// Weight of beat alignment in the combined score
const ALIGNMENT_WEIGHT: f32 = 0.3;

/// Floor for the alignment denominator so tiny beat means cannot blow up the ratio
const MIN_ALIGNMENT_SCALE: f32 = 0.25;

/// How strongly the envelope peaks on the given beat frames
///
/// `(mean_at_beats - global_mean) / max(0.25, mean_at_beats)`, clamped to
/// `[0, 1]`. Frames past the end of the envelope are ignored.
///
/// # Returns
///
/// 0 for an empty envelope, no beats, no in-range beats, or a non-positive
/// mean at the beats.
pub fn compute_beat_alignment_confidence(envelope: &[f32], beat_frames: &[usize]) -> f32 {
    if envelope.is_empty() || beat_frames.is_empty() {
        return 0.0;
    }

    let envelope_mean = envelope.iter().sum::<f32>() / envelope.len() as f32;

    let (sum, count) = beat_frames
        .iter()
        .filter_map(|&frame| envelope.get(frame))
        .fold((0.0f32, 0usize), |(sum, count), &value| (sum + value, count + 1));

    if count == 0 {
        return 0.0;
    }

    let beat_mean = sum / count as f32;
    if beat_mean <= 0.0 {
        return 0.0;
    }

    ((beat_mean - envelope_mean) / beat_mean.max(MIN_ALIGNMENT_SCALE)).clamp(0.0, 1.0)
}

/// Combine tempo clarity and beat alignment into the final confidence
///
/// # Arguments
///
/// * `has_enough_onsets` - False when the grid fallback was used
/// * `clarity` - Tempo clarity (0.0-1.0)
/// * `alignment` - Beat alignment confidence (0.0-1.0)
/// * `low_confidence` - Score reported for grid fallbacks (0.35 by default)
pub fn score_confidence(
    has_enough_onsets: bool,
    clarity: f32,
    alignment: f32,
    low_confidence: f32,
) -> f32 {
    if !has_enough_onsets {
        return low_confidence;
    }
    (CLARITY_WEIGHT * clarity + ALIGNMENT_WEIGHT * alignment).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment_empty_inputs() {
        assert_eq!(compute_beat_alignment_confidence(&[], &[]), 0.0);
        assert_eq!(compute_beat_alignment_confidence(&[1.0, 2.0], &[]), 0.0);
        assert_eq!(compute_beat_alignment_confidence(&[], &[0, 1]), 0.0);
    }

    #[test]
    fn test_alignment_high_when_beats_hit_peaks() {
        let mut envelope = vec![0.1f32; 100];
        for frame in [20, 40, 60, 80] {
            envelope[frame] = 5.0;
        }
        let confidence = compute_beat_alignment_confidence(&envelope, &[20, 40, 60, 80]);
        assert!(confidence > 0.8, "Expected > 0.8, got {}", confidence);
        assert!(confidence <= 1.0);
    }

    #[test]
    fn test_alignment_zero_when_beats_miss_peaks() {
        let mut envelope = vec![0.1f32; 100];
        envelope[20] = 5.0;
        envelope[40] = 5.0;
        assert_eq!(compute_beat_alignment_confidence(&envelope, &[30, 50]), 0.0);
    }

    #[test]
    fn test_alignment_ignores_out_of_range_frames() {
        let envelope = vec![0.0f32, 2.0, 0.0, 0.0];
        assert_eq!(compute_beat_alignment_confidence(&envelope, &[10, 20]), 0.0);
        let with_valid = compute_beat_alignment_confidence(&envelope, &[1, 20]);
        assert!((with_valid - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_score_confidence() {
        assert_eq!(score_confidence(false, 1.0, 1.0, 0.35), 0.35);
        assert!((score_confidence(true, 0.5, 0.5, 0.35) - 0.5).abs() < 1e-6);
        assert_eq!(score_confidence(true, 1.0, 1.0, 0.35), 1.0);
        assert_eq!(score_confidence(true, 0.0, 0.0, 0.35), 0.0);
    }
}
