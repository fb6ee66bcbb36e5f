//! Beatmap modules
//!
//! Turn a beat analysis into playable notes:
//! - Difficulty-tuned note time selection
//! - Deterministic lane assignment and hold merging

pub mod generator;
pub mod lanes;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of playable lanes in classic mode
pub const LANE_COUNT: u8 = 4;

/// Validated lane index in `0..LANE_COUNT`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Lane(u8);

impl Lane {
    /// Leftmost lane (the only lane used in trackpad mode)
    pub const FIRST: Lane = Lane(0);

    /// Lane for `index`, or `None` if out of range
    pub fn new(index: u8) -> Option<Lane> {
        (index < LANE_COUNT).then_some(Lane(index))
    }

    /// Zero-based lane index
    pub fn index(self) -> u8 {
        self.0
    }

    /// All lanes, left to right
    pub fn all() -> impl Iterator<Item = Lane> {
        (0..LANE_COUNT).map(Lane)
    }

    /// Lane `offset` steps away, wrapping around the edges
    pub fn wrapping_shift(self, offset: i8) -> Lane {
        let count = LANE_COUNT as i16;
        Lane(((self.0 as i16 + offset as i16).rem_euclid(count)) as u8)
    }
}

impl TryFrom<u8> for Lane {
    type Error = String;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Lane::new(index).ok_or_else(|| format!("lane {} out of range 0..{}", index, LANE_COUNT))
    }
}

impl From<Lane> for u8 {
    fn from(lane: Lane) -> u8 {
        lane.0
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Input layout the map is generated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// Four lanes
    Classic,
    /// Single lane, no holds
    Trackpad,
}

/// Difficulty level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Strong beats only, wide spacing
    Easy,
    /// Strong beats with occasional half-beats
    Normal,
    /// Most beats plus half-beats on 2 and 4
    Hard,
    /// Every beat, half-beats and triplet fills
    Expert,
}

impl Difficulty {
    /// All difficulties, easiest first
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Normal,
        Difficulty::Hard,
        Difficulty::Expert,
    ];

    /// Tuning parameters for this difficulty
    pub fn config(self) -> DifficultyConfig {
        match self {
            Difficulty::Easy => DifficultyConfig {
                base_stride: 2,
                min_gap: 0.4,
                offbeat_chance: 0.0,
                allow_triplets: false,
                lane_jump_chance: 0.2,
                strength_percentile: 75.0,
            },
            Difficulty::Normal => DifficultyConfig {
                base_stride: 2,
                min_gap: 0.28,
                offbeat_chance: 0.2,
                allow_triplets: false,
                lane_jump_chance: 0.3,
                strength_percentile: 55.0,
            },
            Difficulty::Hard => DifficultyConfig {
                base_stride: 1,
                min_gap: 0.14,
                offbeat_chance: 0.45,
                allow_triplets: false,
                lane_jump_chance: 0.55,
                strength_percentile: 25.0,
            },
            Difficulty::Expert => DifficultyConfig {
                base_stride: 1,
                min_gap: 0.1,
                offbeat_chance: 0.75,
                allow_triplets: true,
                lane_jump_chance: 0.75,
                strength_percentile: 0.0,
            },
        }
    }

    /// Whether the beat at this bar position gets a half-beat note
    ///
    /// Placement is musical rather than random: normal adds one on beat 2 of
    /// every other bar, hard on beats 2 and 4, expert on every beat.
    pub fn wants_half_beat(self, beat_in_bar: usize, bar_index: usize) -> bool {
        match self {
            Difficulty::Easy => false,
            Difficulty::Normal => beat_in_bar == 1 && bar_index % 2 == 0,
            Difficulty::Hard => beat_in_bar == 1 || beat_in_bar == 3,
            Difficulty::Expert => true,
        }
    }

    /// Lowercase name
    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
            Difficulty::Expert => "expert",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Note density and movement parameters of one difficulty
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyConfig {
    /// Use every n-th beat when no strengths are available
    pub base_stride: usize,
    /// Minimum seconds between consecutive notes
    pub min_gap: f64,
    /// Non-zero enables half-beat notes
    pub offbeat_chance: f64,
    /// Triplet fills at the end of odd bars
    pub allow_triplets: bool,
    /// Probability of moving to a neighbouring lane
    pub lane_jump_chance: f64,
    /// Beats at or above this strength percentile become notes
    pub strength_percentile: f64,
}

/// Stable per-map note identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(pub u32);

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Tap or hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteKind {
    /// Single tap
    Normal,
    /// Press and keep holding for `duration`
    Hold,
}

/// One scheduled note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Identifier, unique within its map
    pub id: NoteId,
    /// Hit time in seconds
    pub time: f64,
    /// Lane to press
    pub lane: Lane,
    /// Tap or hold
    pub kind: NoteKind,
    /// Hold length in seconds (holds only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

impl Note {
    /// True for hold notes
    pub fn is_hold(&self) -> bool {
        self.kind == NoteKind::Hold
    }

    /// Hold length, 0 for taps
    pub fn hold_duration(&self) -> f64 {
        self.duration.unwrap_or(0.0)
    }

    /// Time the note is fully resolved (hit time, or hold end)
    pub fn end_time(&self) -> f64 {
        self.time + self.hold_duration()
    }
}

/// Playable note chart for one song, mode and difficulty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeatMap {
    /// Song this map belongs to
    pub song_id: String,
    /// Tempo the map was generated at
    pub bpm: f32,
    /// Notes sorted by time
    pub notes: Vec<Note>,
}

impl BeatMap {
    /// Number of notes
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// True when there is nothing to play
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Latest end time over all notes (0 for an empty map)
    pub fn last_note_end(&self) -> f64 {
        self.notes.iter().map(Note::end_time).fold(0.0, f64::max)
    }
}
