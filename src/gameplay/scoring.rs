//! Point calculation and final grading

use super::{GameScore, Grade, HitResult, Judgment};

/// Points for one judgment at a multiplier
pub fn calculate_score(judgment: Judgment, multiplier: u32) -> u64 {
    judgment.base_score() * u64::from(multiplier)
}

/// Summarize a play-through
///
/// Notes without a recorded result count as misses. Accuracy weights
/// perfect/great/good/miss as 1.0/0.75/0.5/0 and is 0 for an empty map.
///
/// # Arguments
///
/// * `song_id` - Song the map belongs to
/// * `song_name` - Display name
/// * `total_notes` - Notes in the map
/// * `hit_results` - Recorded judgments, at most one per note
/// * `max_combo` - Longest combo reached
/// * `total_score` - Points accumulated during play
pub fn calculate_final_score(
    song_id: &str,
    song_name: &str,
    total_notes: usize,
    hit_results: &[HitResult],
    max_combo: u32,
    total_score: u64,
) -> GameScore {
    if hit_results.len() > total_notes {
        log::warn!(
            "{} hit results recorded for {} notes in '{}'",
            hit_results.len(),
            total_notes,
            song_id
        );
    }

    let count = |judgment: Judgment| {
        hit_results
            .iter()
            .filter(|r| r.judgment == judgment)
            .count()
    };
    let perfects = count(Judgment::Perfect);
    let greats = count(Judgment::Great);
    let goods = count(Judgment::Good);
    let recorded_misses = count(Judgment::Miss);
    let unjudged = total_notes.saturating_sub(hit_results.len());
    let misses = recorded_misses + unjudged;

    let accuracy = if total_notes == 0 {
        0.0
    } else {
        let weighted: f64 = hit_results
            .iter()
            .map(|r| r.judgment.accuracy_weight())
            .sum();
        (weighted / total_notes as f64 * 100.0).clamp(0.0, 100.0)
    };

    log::debug!(
        "Final score for '{}': {} pts, {:.2}% ({}/{}/{}/{})",
        song_id,
        total_score,
        accuracy,
        perfects,
        greats,
        goods,
        misses
    );

    GameScore {
        song_id: song_id.to_string(),
        song_name: song_name.to_string(),
        total_notes,
        perfects,
        greats,
        goods,
        misses,
        max_combo,
        score: total_score,
        accuracy,
        grade: Grade::from_accuracy(accuracy),
    }
}
