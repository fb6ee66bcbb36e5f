//! Gameplay modules
//!
//! Judge player input against a beatmap in real time:
//! - Note lifecycle tracking and timing judgment
//! - Combo and multiplier tracking
//! - Scoring and final grading
//! - Game loop orchestration with a polled event queue

pub mod combo;
pub mod constants;
pub mod engine;
pub mod events;
pub mod note_tracker;
pub mod scheduler;
pub mod scoring;

use crate::beatmap::NoteId;
use constants::{
    GOOD_WINDOW_MS, GRADE_A_ACCURACY, GRADE_B_ACCURACY, GRADE_S_ACCURACY, GREAT_WINDOW_MS,
    PERFECT_WINDOW_MS,
};
use serde::{Deserialize, Serialize};

/// Timing judgment of a single note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Judgment {
    /// Within ±30 ms
    Perfect,
    /// Within ±70 ms
    Great,
    /// Within ±120 ms
    Good,
    /// Not hit in time
    Miss,
}

impl Judgment {
    /// Judgment for an absolute timing error, `None` outside the good window
    pub fn from_offset_ms(abs_delta_ms: f64) -> Option<Judgment> {
        if abs_delta_ms <= PERFECT_WINDOW_MS {
            Some(Judgment::Perfect)
        } else if abs_delta_ms <= GREAT_WINDOW_MS {
            Some(Judgment::Great)
        } else if abs_delta_ms <= GOOD_WINDOW_MS {
            Some(Judgment::Good)
        } else {
            None
        }
    }

    /// Points before the combo multiplier
    pub fn base_score(self) -> u64 {
        match self {
            Judgment::Perfect => 300,
            Judgment::Great => 200,
            Judgment::Good => 100,
            Judgment::Miss => 0,
        }
    }

    /// Contribution to accuracy (1.0 for perfect)
    pub fn accuracy_weight(self) -> f64 {
        match self {
            Judgment::Perfect => 1.0,
            Judgment::Great => 0.75,
            Judgment::Good => 0.5,
            Judgment::Miss => 0.0,
        }
    }

    /// True for anything but a miss
    pub fn is_hit(self) -> bool {
        self != Judgment::Miss
    }
}

/// Letter grade from accuracy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    /// ≥ 95%
    S,
    /// ≥ 85%
    A,
    /// ≥ 70%
    B,
    /// Everything else
    C,
}

impl Grade {
    /// Grade for an accuracy percentage
    pub fn from_accuracy(accuracy: f64) -> Grade {
        if accuracy >= GRADE_S_ACCURACY {
            Grade::S
        } else if accuracy >= GRADE_A_ACCURACY {
            Grade::A
        } else if accuracy >= GRADE_B_ACCURACY {
            Grade::B
        } else {
            Grade::C
        }
    }
}

/// Outcome of one note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitResult {
    /// Note that was judged
    pub note_id: NoteId,
    /// Timing judgment
    pub judgment: Judgment,
    /// Signed timing error in ms (negative = early; 0 for auto-misses)
    pub delta_ms: f64,
    /// Combo right after this note was judged
    pub combo_at_hit: u32,
}

/// Final result of a play-through
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameScore {
    /// Song the map was generated for
    pub song_id: String,
    /// Display name of the song
    pub song_name: String,
    /// Notes in the map
    pub total_notes: usize,
    /// Perfect judgments
    pub perfects: usize,
    /// Great judgments
    pub greats: usize,
    /// Good judgments
    pub goods: usize,
    /// Misses, including notes that were never judged
    pub misses: usize,
    /// Longest combo reached
    pub max_combo: u32,
    /// Total points
    pub score: u64,
    /// Weighted accuracy in percent (0-100)
    pub accuracy: f64,
    /// Letter grade
    pub grade: Grade,
}
