//! Gameplay timing and scoring constants

/// Perfect judgment window (±ms)
pub const PERFECT_WINDOW_MS: f64 = 30.0;

/// Great judgment window (±ms)
pub const GREAT_WINDOW_MS: f64 = 70.0;

/// Good judgment window (±ms); anything later is a miss
pub const GOOD_WINDOW_MS: f64 = 120.0;

/// Presses this close to a note (but outside the good window) count as near misses (ms)
pub const NEAR_MISS_WINDOW_MS: f64 = 150.0;

/// Seconds a note takes to fall from spawn to the hit line
pub const NOTE_FALL_DURATION: f64 = 2.0;

/// Seconds between score ticks while a hold is held
pub const HOLD_TICK_INTERVAL: f64 = 0.1;

/// Releasing a hold more than this many seconds before its end breaks it
pub const EARLY_RELEASE_TOLERANCE: f64 = 0.2;

/// Base points per hold tick (scaled by the multiplier)
pub const HOLD_TICK_SCORE: u64 = 10;

/// `(combo, multiplier)` steps, ascending
pub const COMBO_THRESHOLDS: [(u32, u32); 5] = [(0, 1), (10, 2), (30, 4), (50, 8), (100, 16)];

/// Combos below this never count as milestones
pub const MIN_MILESTONE_COMBO: u32 = 10;

/// Past 50, every multiple of this is a milestone
pub const MILESTONE_INTERVAL: u32 = 50;

/// Minimum accuracy (%) for grade S
pub const GRADE_S_ACCURACY: f64 = 95.0;

/// Minimum accuracy (%) for grade A
pub const GRADE_A_ACCURACY: f64 = 85.0;

/// Minimum accuracy (%) for grade B
pub const GRADE_B_ACCURACY: f64 = 70.0;

/// Seconds of play after the song ends before the game finishes
pub const END_GAME_BUFFER: f64 = 2.0;
