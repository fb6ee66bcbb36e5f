//! Dynamic-programming beat tracker
//!
//! Finds the beat sequence that maximizes total onset strength while keeping
//! inter-beat intervals close to the target period.
//!
//! # Algorithm
//!
//! For every frame `i`:
//! ```text
//! score[i] = env[i] + max(0-predecessor, score[i - lag] - tightness · ln(lag / target)²)
//! ```
//! over `lag ∈ [0.7·target, 1.4·target]`. The best path is recovered by
//! backtracking from the highest-scoring frame, then beats closer than
//! `0.45·target` are merged (the stronger survives).
//!
//! # Reference
//!
//! Ellis, D. P. W. (2007). Beat Tracking by Dynamic Programming.
//! *Journal of New Music Research*, 36(1), 51-60.

use super::BeatSequence;

/// Track beats through an onset envelope
///
/// # Arguments
///
/// * `envelope` - Onset strength per frame
/// * `target_lag` - Expected beat period in frames (from tempo estimation)
/// * `tightness` - Penalty weight for deviating from `target_lag` (22 is typical)
///
/// # Returns
///
/// `BeatSequence` with strictly increasing frames; empty for an empty envelope.
///
/// # Example
///
/// ```
/// use beatlane::features::beat_tracking::dynamic_programming::track_beats;
///
/// let mut envelope = vec![0.1f32; 200];
/// for i in (20..200).step_by(20) {
///     envelope[i] = 2.0;
/// }
/// let beats = track_beats(&envelope, 20, 22.0);
/// assert!(beats.len() > 5);
/// ```
pub fn track_beats(envelope: &[f32], target_lag: usize, tightness: f32) -> BeatSequence {
    if envelope.is_empty() {
        return BeatSequence::default();
    }

    let target = target_lag.max(1) as f32;
    let lag_min = ((target * 0.7).floor() as usize).max(1);
    let lag_max = ((target * 1.4).ceil() as usize).max(lag_min + 1);

    // Penalty depends only on the lag, so precompute it once
    let penalties: Vec<f32> = (lag_min..=lag_max)
        .map(|lag| -tightness * (lag as f32 / target).ln().powi(2))
        .collect();

    let mut score = vec![0.0f32; envelope.len()];
    let mut previous: Vec<Option<usize>> = vec![None; envelope.len()];

    for (i, &local) in envelope.iter().enumerate() {
        let mut best_score = local;
        let mut best_prev = None;

        for (lag, &penalty) in (lag_min..=lag_max).zip(&penalties) {
            let Some(prev_idx) = i.checked_sub(lag) else {
                break;
            };
            let candidate = score[prev_idx] + local + penalty;
            if candidate > best_score {
                best_score = candidate;
                best_prev = Some(prev_idx);
            }
        }

        score[i] = best_score;
        previous[i] = best_prev;
    }

    // First frame with the global maximum
    let mut cursor = 0;
    for i in 1..score.len() {
        if score[i] > score[cursor] {
            cursor = i;
        }
    }

    let mut path = vec![cursor];
    while let Some(prev) = previous[cursor] {
        path.push(prev);
        cursor = prev;
    }
    path.reverse();

    log::debug!(
        "DP beat tracking: {} frames, lags [{}, {}], path of {} beats (score {:.3})",
        envelope.len(),
        lag_min,
        lag_max,
        path.len(),
        score[path[path.len() - 1]]
    );

    merge_close_beats(&path, envelope, target)
}

/// Collapse beats closer than `0.45 · target`, keeping the stronger one
fn merge_close_beats(path: &[usize], envelope: &[f32], target: f32) -> BeatSequence {
    let min_gap = ((target * 0.45).floor() as usize).max(1);
    let mut beats = BeatSequence::default();

    for &frame in path {
        let strength = envelope.get(frame).copied().unwrap_or(0.0);
        match (beats.frames.last_mut(), beats.strengths.last_mut()) {
            (Some(last_frame), Some(last_strength)) if frame - *last_frame < min_gap => {
                if strength > *last_strength {
                    *last_frame = frame;
                    *last_strength = strength;
                }
            }
            _ => {
                beats.frames.push(frame);
                beats.strengths.push(strength);
            }
        }
    }

    beats
}
