//! Beatmap generation
//!
//! Turns analysed beats into a note chart for one mode and difficulty.
//!
//! # Algorithm
//!
//! 1. **Beat selection**: with per-beat strengths, keep beats at or above the
//!    difficulty's strength percentile; without, keep every `base_stride`-th beat
//! 2. **Subdivisions**: on stable intervals (0.22–0.9 s) add half-beats at the
//!    difficulty's bar positions, and triplet fills at the end of odd bars (expert)
//! 3. **Spacing**: sort, then drop any note closer than `min_gap` to the last kept one
//! 4. **Lanes**: deterministic hash walk (see [`lanes`](super::lanes)); trackpad uses lane 0
//! 5. **Holds**: (normal and up, classic only) a note 0.2–0.8 s after the last
//!    kept note in its lane may fold into it as a hold
//!
//! Generation is pure and bit-for-bit deterministic; note ids are assigned
//! sequentially at the end.
//!
//! # Example
//!
//! ```
//! use beatlane::beatmap::generator::generate_beat_map;
//! use beatlane::beatmap::{Difficulty, GameMode};
//! use beatlane::BeatAnalysis;
//!
//! let analysis = BeatAnalysis {
//!     bpm: 120.0,
//!     beats: (0..64).map(|i| i as f64 * 0.5).collect(),
//!     confidence: 0.9,
//!     beat_strengths: None,
//! };
//! let map = generate_beat_map("song-1", &analysis, GameMode::Classic, Difficulty::Hard);
//! assert!(!map.notes.is_empty());
//! ```

use super::lanes::{seeded_value, LaneAssigner};
use super::{BeatMap, Difficulty, GameMode, Lane, Note, NoteId, NoteKind, LANE_COUNT};
use crate::analysis::result::BeatAnalysis;

/// Beats per bar (4/4 assumption)
const BEATS_PER_BAR: usize = 4;

/// Intervals outside this range (seconds) get no subdivisions
const STABLE_INTERVAL_MIN: f64 = 0.22;
const STABLE_INTERVAL_MAX: f64 = 0.9;

/// Triplet fills need at least this much room (seconds)
const TRIPLET_MIN_INTERVAL: f64 = 0.36;

/// Gap (seconds) between two same-lane notes that may become a hold
const HOLD_MIN_GAP: f64 = 0.2;
const HOLD_MAX_GAP: f64 = 0.8;

/// Holds end this long (seconds) before the note they absorbed
const HOLD_RELEASE_LEAD: f64 = 0.1;

/// Hash threshold below which an eligible pair becomes a hold
const HOLD_CHANCE: f64 = 0.4;

/// Longest run of consecutive same-lane notes a map may contain
const MAX_LANE_RUN: usize = 3;

/// Generate a note chart from a beat analysis
///
/// # Arguments
///
/// * `song_id` - Identifier copied into the map
/// * `analysis` - Beats (and optional strengths) to build from
/// * `mode` - Classic (4 lanes) or trackpad (1 lane, no holds)
/// * `difficulty` - Density and movement tuning
///
/// # Returns
///
/// `BeatMap` with time-sorted notes; empty when there are no beats. Never fails.
pub fn generate_beat_map(
    song_id: &str,
    analysis: &BeatAnalysis,
    mode: GameMode,
    difficulty: Difficulty,
) -> BeatMap {
    let note_times = generate_note_times(&analysis.beats, analysis.strengths(), difficulty);

    let mut notes: Vec<Note> = match mode {
        GameMode::Trackpad => note_times
            .iter()
            .map(|&time| tap(time, Lane::FIRST))
            .collect(),
        GameMode::Classic => {
            let mut assigner = LaneAssigner::new(difficulty.config().lane_jump_chance);
            note_times
                .iter()
                .enumerate()
                .map(|(i, &time)| tap(time, assigner.next_lane(i, time)))
                .collect()
        }
    };

    if mode == GameMode::Classic && difficulty != Difficulty::Easy {
        notes = merge_holds(notes);
    }

    for (index, note) in notes.iter_mut().enumerate() {
        note.id = NoteId(index as u32);
    }

    log::debug!(
        "Generated {} {} map for '{}': {} notes ({} holds) from {} beats",
        match mode {
            GameMode::Classic => "classic",
            GameMode::Trackpad => "trackpad",
        },
        difficulty,
        song_id,
        notes.len(),
        notes.iter().filter(|n| n.is_hold()).count(),
        analysis.beats.len()
    );

    BeatMap {
        song_id: song_id.to_string(),
        bpm: analysis.bpm,
        notes,
    }
}

/// Generate one map per difficulty, easiest first
pub fn generate_all_difficulties(
    song_id: &str,
    analysis: &BeatAnalysis,
    mode: GameMode,
) -> Vec<(Difficulty, BeatMap)> {
    Difficulty::ALL
        .iter()
        .map(|&difficulty| {
            (
                difficulty,
                generate_beat_map(song_id, analysis, mode, difficulty),
            )
        })
        .collect()
}

/// Select note times from beats for a difficulty
///
/// # Arguments
///
/// * `beats` - Beat times in seconds, ascending
/// * `strengths` - Optional per-beat strengths; ignored unless parallel to `beats`
/// * `difficulty` - Density tuning
///
/// # Returns
///
/// Ascending note times, consecutive ones at least `min_gap` apart
pub fn generate_note_times(
    beats: &[f64],
    strengths: Option<&[f32]>,
    difficulty: Difficulty,
) -> Vec<f64> {
    if beats.is_empty() {
        return Vec::new();
    }

    let config = difficulty.config();
    let strengths = strengths.filter(|s| s.len() == beats.len());
    let threshold = strengths.map(|s| percentile(s, config.strength_percentile));

    let mut candidates = Vec::with_capacity(beats.len() * 2);

    for (i, &beat_time) in beats.iter().enumerate() {
        let beat_in_bar = i % BEATS_PER_BAR;
        let bar_index = i / BEATS_PER_BAR;

        // Strengths, when present, replace the stride entirely
        let selected = match (strengths, threshold) {
            (Some(strengths), Some(threshold)) => strengths[i] >= threshold,
            _ => i % config.base_stride.max(1) == 0,
        };
        if !selected {
            continue;
        }

        candidates.push(beat_time);

        let Some(&next_beat) = beats.get(i + 1) else {
            continue;
        };
        let interval = next_beat - beat_time;
        let stable = interval > STABLE_INTERVAL_MIN && interval < STABLE_INTERVAL_MAX;

        if stable && config.offbeat_chance > 0.0 && difficulty.wants_half_beat(beat_in_bar, bar_index)
        {
            candidates.push(beat_time + interval * 0.5);
        }

        if config.allow_triplets
            && stable
            && interval > TRIPLET_MIN_INTERVAL
            && beat_in_bar == BEATS_PER_BAR - 1
            && bar_index % 2 == 1
        {
            candidates.push(beat_time + interval / 3.0);
            candidates.push(beat_time + 2.0 * interval / 3.0);
        }
    }

    candidates.sort_by(|a, b| a.total_cmp(b));

    let mut times: Vec<f64> = Vec::with_capacity(candidates.len());
    for time in candidates {
        match times.last() {
            Some(&last) if time - last < config.min_gap => {}
            _ => times.push(time),
        }
    }

    times
}

/// Value at `p` percent of the sorted strengths (`sorted[floor(p/100·n)]`, clamped)
fn percentile(values: &[f32], p: f64) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let index = ((p / 100.0) * sorted.len() as f64).floor() as usize;
    sorted[index.min(sorted.len() - 1)]
}

fn tap(time: f64, lane: Lane) -> Note {
    Note {
        id: NoteId(0),
        time,
        lane,
        kind: NoteKind::Normal,
        duration: None,
    }
}

/// Fold eligible same-lane pairs into holds
///
/// Each lane remembers its last kept note; a later note in that lane 0.2–0.8 s
/// after it may be absorbed, turning the earlier note into a hold. A hold never
/// absorbs a second note, and a note is never absorbed if dropping it would
/// join its neighbours into a same-lane run longer than three.
fn merge_holds(notes: Vec<Note>) -> Vec<Note> {
    let mut merged: Vec<Note> = Vec::with_capacity(notes.len());
    let mut lane_last: [Option<usize>; LANE_COUNT as usize] = [None; LANE_COUNT as usize];

    for (index, note) in notes.iter().enumerate() {
        let slot = note.lane.index() as usize;

        if let Some(last_index) = lane_last[slot] {
            let gap = note.time - merged[last_index].time;
            if gap > HOLD_MIN_GAP
                && gap <= HOLD_MAX_GAP
                && seeded_value(note.lane.index() as f64, note.time) < HOLD_CHANCE
                && !joins_long_run(&merged, &notes[index + 1..])
            {
                let hold = &mut merged[last_index];
                hold.kind = NoteKind::Hold;
                hold.duration = Some(gap - HOLD_RELEASE_LEAD);
                lane_last[slot] = None;
                continue;
            }
        }

        lane_last[slot] = Some(merged.len());
        merged.push(note.clone());
    }

    merged
}

/// Whether removing the note between `kept` and `upcoming` would create a
/// same-lane run longer than [`MAX_LANE_RUN`]
fn joins_long_run(kept: &[Note], upcoming: &[Note]) -> bool {
    let (Some(before), Some(after)) = (kept.last(), upcoming.first()) else {
        return false;
    };
    if before.lane != after.lane {
        return false;
    }

    let back = kept.iter().rev().take_while(|n| n.lane == before.lane).count();
    let forward = upcoming.iter().take_while(|n| n.lane == after.lane).count();
    back + forward > MAX_LANE_RUN
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis(beats: Vec<f64>, strengths: Option<Vec<f32>>) -> BeatAnalysis {
        BeatAnalysis {
            bpm: 120.0,
            beats,
            confidence: 1.0,
            beat_strengths: strengths,
        }
    }

    fn spaced_beats(count: usize, interval: f64) -> Vec<f64> {
        (0..count).map(|i| i as f64 * interval).collect()
    }

    /// Deterministic strengths in [0, 1)
    fn pseudo_random_strengths(count: usize) -> Vec<f32> {
        let mut state = 0x2545_f491u32;
        (0..count)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                (state % 10_000) as f32 / 10_000.0
            })
            .collect()
    }

    #[test]
    fn test_density_scales_with_difficulty() {
        let input = analysis(spaced_beats(100, 0.3), Some(pseudo_random_strengths(100)));
        let counts: Vec<usize> = Difficulty::ALL
            .iter()
            .map(|&d| generate_beat_map("test", &input, GameMode::Classic, d).len())
            .collect();

        assert!(counts[0] < counts[1], "easy {} vs normal {}", counts[0], counts[1]);
        assert!(counts[1] <= counts[2], "normal {} vs hard {}", counts[1], counts[2]);
        assert!(counts[2] <= counts[3], "hard {} vs expert {}", counts[2], counts[3]);
        assert!(counts[3] > 80, "expert only produced {}", counts[3]);
    }

    fn varied_strengths(count: usize) -> Vec<f32> {
        (0..count).map(|i| ((i * 7) % 10) as f32 / 10.0).collect()
    }

    #[test]
    fn test_trackpad_uses_lane_zero_and_no_holds() {
        let beats = spaced_beats(64, 0.45);
        let inputs = [
            analysis(beats.clone(), None),
            analysis(beats.clone(), Some(varied_strengths(beats.len()))),
        ];
        for input in &inputs {
            for difficulty in Difficulty::ALL {
                let map = generate_beat_map("test", input, GameMode::Trackpad, difficulty);
                assert!(!map.is_empty(), "{} trackpad map is empty", difficulty);
                for note in &map.notes {
                    assert_eq!(note.lane, Lane::FIRST, "{} note {:?} off lane 0", difficulty, note.id);
                    assert_eq!(note.kind, NoteKind::Normal, "{} trackpad map has a hold", difficulty);
                }
            }
        }
    }

    #[test]
    fn test_empty_beats() {
        let map = generate_beat_map("test", &analysis(vec![], None), GameMode::Classic, Difficulty::Normal);
        assert!(map.notes.is_empty());
        assert_eq!(map.song_id, "test");
    }

    #[test]
    fn test_single_beat() {
        let map = generate_beat_map("test", &analysis(vec![1.0], None), GameMode::Classic, Difficulty::Normal);
        assert_eq!(map.len(), 1);
        assert_eq!(map.notes[0].time, 1.0);
        assert_eq!(map.notes[0].id, NoteId(0));
    }

    #[test]
    fn test_min_gap_enforced() {
        for interval in [0.05, 0.13, 0.3] {
            let beats = spaced_beats(60, interval);
            let inputs = [
                analysis(beats.clone(), None),
                analysis(beats.clone(), Some(varied_strengths(beats.len()))),
            ];
            for input in &inputs {
                for difficulty in Difficulty::ALL {
                    let min_gap = difficulty.config().min_gap;
                    let map = generate_beat_map("test", input, GameMode::Classic, difficulty);
                    for pair in map.notes.windows(2) {
                        let gap = pair[1].time - pair[0].time;
                        assert!(
                            gap >= min_gap - 1e-9,
                            "{} map at {}s spacing has a {}s gap",
                            difficulty,
                            interval,
                            gap
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_expert_adds_offbeats() {
        let beats = spaced_beats(16, 0.5);
        let input = analysis(beats.clone(), None);
        let easy = generate_beat_map("test", &input, GameMode::Classic, Difficulty::Easy);
        let expert = generate_beat_map("test", &input, GameMode::Classic, Difficulty::Expert);

        assert!(expert.len() > easy.len());
        assert!(expert.notes.iter().any(|n| !beats.contains(&n.time)));
    }

    #[test]
    fn test_expert_triplet_fill_positions() {
        let has = |times: &[f64], t: f64| times.iter().any(|&x| (x - t).abs() < 1e-9);

        // Beat 7 closes odd bar 1 but has no successor: no fill yet
        let times = generate_note_times(&spaced_beats(8, 0.5), None, Difficulty::Expert);
        assert!(!has(&times, 3.5 + 0.5 / 3.0));

        let times = generate_note_times(&spaced_beats(9, 0.5), None, Difficulty::Expert);
        assert!(has(&times, 3.5 + 0.5 / 3.0));
        assert!(has(&times, 3.5 + 1.0 / 3.0));
        // The half-beat between the two fills is too close to survive min_gap
        assert!(!has(&times, 3.75));
        // Even bar 0 gets no fill
        assert!(!has(&times, 1.5 + 0.5 / 3.0));
    }

    #[test]
    fn test_normal_half_beats_on_even_bars() {
        let has = |times: &[f64], t: f64| times.iter().any(|&x| (x - t).abs() < 1e-9);

        // Stride 2 only ever selects beat-in-bar 0 and 2, so no half-beats
        let times = generate_note_times(&spaced_beats(12, 0.5), None, Difficulty::Normal);
        assert!(times.iter().all(|t| (t / 0.5).fract() == 0.0));

        // Strengths select beats 0, 1 of every bar
        let beats = spaced_beats(12, 0.8);
        let strengths: Vec<f32> = (0..12).map(|i| if i % 4 < 2 { 1.0 } else { 0.0 }).collect();
        let times = generate_note_times(&beats, Some(&strengths), Difficulty::Normal);
        assert!(has(&times, 1.2));
        assert!(!has(&times, 4.4));
        assert!(has(&times, 7.6));
    }

    #[test]
    fn test_all_lanes_used_in_classic() {
        let input = analysis(spaced_beats(100, 0.5), None);
        let map = generate_beat_map("test", &input, GameMode::Classic, Difficulty::Normal);
        for lane in Lane::all() {
            assert!(map.notes.iter().any(|n| n.lane == lane), "Lane {} unused", lane);
        }
    }

    fn longest_lane_run(notes: &[Note]) -> usize {
        let mut longest = usize::from(!notes.is_empty());
        let mut run = 1;
        for pair in notes.windows(2) {
            run = if pair[1].lane == pair[0].lane { run + 1 } else { 1 };
            longest = longest.max(run);
        }
        longest
    }

    #[test]
    fn test_no_long_same_lane_runs() {
        for difficulty in Difficulty::ALL {
            let input = analysis(spaced_beats(150, 0.5), None);
            let map = generate_beat_map("test", &input, GameMode::Classic, difficulty);
            let run = longest_lane_run(&map.notes);
            assert!(run <= 3, "{} map has a run of {}", difficulty, run);
        }
    }

    #[test]
    fn test_holds_form_at_dense_spacing_without_long_runs() {
        for interval in [0.3, 0.45] {
            for count in [200, 400] {
                let input = analysis(spaced_beats(count, interval), None);
                for difficulty in [Difficulty::Hard, Difficulty::Expert] {
                    let map = generate_beat_map("test", &input, GameMode::Classic, difficulty);
                    let holds = map.notes.iter().filter(|n| n.is_hold()).count();
                    assert!(holds > 0, "{} at {}s spacing produced no holds", difficulty, interval);

                    let run = longest_lane_run(&map.notes);
                    assert!(
                        run <= 3,
                        "{} at {}s spacing has a run of {}",
                        difficulty,
                        interval,
                        run
                    );
                }
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let input = analysis(spaced_beats(50, 0.4), None);
        let first = generate_beat_map("test", &input, GameMode::Classic, Difficulty::Hard);
        let second = generate_beat_map("test", &input, GameMode::Classic, Difficulty::Hard);
        assert_eq!(first, second);
    }

    #[test]
    fn test_strength_filter_on_easy() {
        let beats: Vec<f64> = (1..=8).map(|i| i as f64).collect();
        let strengths = vec![1.0, 0.1, 0.1, 0.1, 1.0, 0.1, 0.1, 0.1];
        let map = generate_beat_map(
            "test",
            &analysis(beats, Some(strengths)),
            GameMode::Classic,
            Difficulty::Easy,
        );

        let times: Vec<f64> = map.notes.iter().map(|n| n.time).collect();
        assert_eq!(times, vec![1.0, 5.0]);
    }

    #[test]
    fn test_mismatched_strengths_fall_back_to_stride() {
        let beats = spaced_beats(8, 1.0);
        let times = generate_note_times(&beats, Some(&[1.0, 0.0]), Difficulty::Easy);
        assert_eq!(times, vec![0.0, 2.0, 4.0, 6.0]);
    }

    #[test]
    fn test_holds_are_well_formed() {
        let input = analysis(spaced_beats(200, 0.45), None);
        for difficulty in [Difficulty::Normal, Difficulty::Hard, Difficulty::Expert] {
            let map = generate_beat_map("test", &input, GameMode::Classic, difficulty);
            for (i, note) in map.notes.iter().enumerate() {
                assert_eq!(note.id, NoteId(i as u32));
                if note.is_hold() {
                    let duration = note.duration.unwrap();
                    assert!(duration > 0.1 - 1e-9 && duration <= 0.7 + 1e-9);
                    let next_in_lane = map.notes[i + 1..].iter().find(|n| n.lane == note.lane);
                    if let Some(next) = next_in_lane {
                        assert!(next.time > note.end_time(), "{} hold overlaps {:?}", difficulty, next.id);
                    }
                } else {
                    assert!(note.duration.is_none());
                }
            }
        }

        let easy = generate_beat_map("test", &input, GameMode::Classic, Difficulty::Easy);
        assert!(easy.notes.iter().all(|n| !n.is_hold()));
    }

    #[test]
    fn test_percentile() {
        let values = [0.5, 0.1, 0.9, 0.3];
        assert_eq!(percentile(&values, 0.0), 0.1);
        assert_eq!(percentile(&values, 50.0), 0.5);
        assert_eq!(percentile(&values, 75.0), 0.9);
        assert_eq!(percentile(&values, 100.0), 0.9);
    }
}
