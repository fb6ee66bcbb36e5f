//! Deterministic lane assignment
//!
//! Lane choices come from a fixed hash of note index and time rather than an
//! RNG, so the same analysis always yields the same map on every platform
//! that implements IEEE-754 `sin`.

use super::{Lane, LANE_COUNT};

/// Index multiplier of the seeding hash
const INDEX_SCALE: f64 = 12.9898;

/// Time multiplier of the seeding hash
const TIME_SCALE: f64 = 78.233;

/// Same-lane streak length that forces a move
const MAX_SAME_LANE: u32 = 3;

/// Pseudo-random value in `[0, 1]` derived from `(index, time)`
///
/// `|sin(index · 12.9898 + time · 78.233)|`
pub fn seeded_value(index: f64, time: f64) -> f64 {
    (index * INDEX_SCALE + time * TIME_SCALE).sin().abs()
}

/// Walks the note sequence assigning lanes
///
/// - First note: `floor(seed · 4)`
/// - Later notes: jump one lane (right if `seed > 0.5`, else left, wrapping)
///   when `seed < lane_jump_chance`, otherwise stay
/// - A third consecutive note in the same lane is pushed one lane right
#[derive(Debug, Clone)]
pub struct LaneAssigner {
    lane_jump_chance: f64,
    previous: Option<Lane>,
    same_lane_count: u32,
}

impl LaneAssigner {
    /// Assigner for a difficulty's jump probability
    pub fn new(lane_jump_chance: f64) -> Self {
        Self {
            lane_jump_chance,
            previous: None,
            same_lane_count: 0,
        }
    }

    /// Lane for the note at `index` (position in the note list) and `time`
    pub fn next_lane(&mut self, index: usize, time: f64) -> Lane {
        let seed = seeded_value(index as f64, time);

        let mut lane = match self.previous {
            None => {
                let slot = ((seed * LANE_COUNT as f64).floor() as u8).min(LANE_COUNT - 1);
                Lane::new(slot).unwrap_or(Lane::FIRST)
            }
            Some(previous) if seed < self.lane_jump_chance => {
                previous.wrapping_shift(if seed > 0.5 { 1 } else { -1 })
            }
            Some(previous) => previous,
        };

        if Some(lane) == self.previous {
            self.same_lane_count += 1;
            if self.same_lane_count >= MAX_SAME_LANE {
                lane = lane.wrapping_shift(1);
                self.same_lane_count = 1;
            }
        } else {
            self.same_lane_count = 1;
        }

        self.previous = Some(lane);
        lane
    }
}
