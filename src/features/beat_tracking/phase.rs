//! Beat phase refinement and downbeat inference
//!
//! The DP tracker trades exact onset alignment for tempo regularity. Refinement
//! snaps each beat back onto the strongest nearby onset; downbeat inference
//! assumes 4/4 and picks the bar phase whose beats stand out most.

use super::BeatSequence;

/// Fewer beats than this carry no usable bar-phase information
const MIN_BEATS_FOR_DOWNBEAT: usize = 8;

/// Beats per bar (4/4 assumption)
const BEATS_PER_BAR: usize = 4;

/// Snap each beat to the strongest onset within ±25% of the beat period
///
/// A frame only moves when a strictly stronger frame exists in its window.
/// When two consecutive beats snap to the same frame the second is dropped.
///
/// # Arguments
///
/// * `frames` - Beat frames from the tracker
/// * `envelope` - Onset strength per frame
/// * `target_lag` - Beat period in frames
///
/// # Returns
///
/// Refined beats with the envelope strength at each refined frame
pub fn refine_beat_phases(frames: &[usize], envelope: &[f32], target_lag: usize) -> BeatSequence {
    let radius = (target_lag as f32 * 0.25).round() as usize;
    let mut refined = BeatSequence::default();

    for &center in frames {
        let mut best_frame = center;
        let mut best_strength = envelope.get(center).copied().unwrap_or(0.0);

        if !envelope.is_empty() {
            let from = center.saturating_sub(radius);
            let to = (center + radius).min(envelope.len() - 1);
            for frame in from..=to {
                let strength = envelope[frame];
                if strength > best_strength {
                    best_strength = strength;
                    best_frame = frame;
                }
            }
        }

        if refined.frames.last() != Some(&best_frame) {
            refined.frames.push(best_frame);
            refined.strengths.push(best_strength);
        }
    }

    log::debug!(
        "Refined {} beats to {} (radius {} frames)",
        frames.len(),
        refined.len(),
        radius
    );

    refined
}

/// Infer which beat index (0–3) starts a bar
///
/// Strengths are summed per phase `i mod 4`; the phase that rises furthest
/// above the mean of its two neighbouring phases wins. Ties go to the lowest
/// phase.
///
/// # Returns
///
/// Phase in `0..4`; 0 when fewer than 8 strengths are given
pub fn infer_downbeat_phase(strengths: &[f32]) -> usize {
    if strengths.len() < MIN_BEATS_FOR_DOWNBEAT {
        return 0;
    }

    let mut phase_scores = [0.0f32; BEATS_PER_BAR];
    for (i, &strength) in strengths.iter().enumerate() {
        phase_scores[i % BEATS_PER_BAR] += strength;
    }

    let mut best_phase = 0;
    let mut best_contrast = f32::NEG_INFINITY;
    for phase in 0..BEATS_PER_BAR {
        let neighbor_mean = (phase_scores[(phase + 1) % BEATS_PER_BAR]
            + phase_scores[(phase + BEATS_PER_BAR - 1) % BEATS_PER_BAR])
            / 2.0;
        let contrast = phase_scores[phase] - neighbor_mean;
        if contrast > best_contrast {
            best_contrast = contrast;
            best_phase = phase;
        }
    }

    log::debug!(
        "Downbeat phase scores {:?} -> phase {}",
        phase_scores,
        best_phase
    );

    best_phase
}
