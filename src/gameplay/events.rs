//! Game events for the presentation layer
//!
//! The engine pushes events as they happen; the host drains them once per
//! frame to trigger sounds, particles and UI.

use super::Judgment;
use crate::beatmap::Lane;
use std::collections::VecDeque;

/// Something the player should see or hear
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    /// A note was hit
    Hit {
        /// Timing judgment
        judgment: Judgment,
        /// Lane of the note
        lane: Lane,
        /// Combo after the hit
        combo: u32,
        /// Multiplier after the hit
        multiplier: u32,
    },
    /// A note passed unhit
    Miss {
        /// Lane of the note
        lane: Lane,
    },
    /// Press just outside the good window
    NearMiss {
        /// Pressed lane
        lane: Lane,
    },
    /// Press with no note nearby
    GhostPress {
        /// Pressed lane
        lane: Lane,
    },
    /// Combo reached a milestone
    ComboMilestone {
        /// Combo reached
        combo: u32,
    },
    /// A running combo ended
    ComboBreak {
        /// Combo before the break
        previous_combo: u32,
    },
    /// A hold was held to its end
    HoldComplete {
        /// Lane of the hold
        lane: Lane,
    },
    /// A hold was released too early
    HoldBroken {
        /// Lane of the hold
        lane: Lane,
    },
}

/// FIFO of pending events
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: VecDeque<GameEvent>,
}

impl EventQueue {
    /// Empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event
    pub fn push(&mut self, event: GameEvent) {
        self.events.push_back(event);
    }

    /// Take every pending event, oldest first
    pub fn drain(&mut self) -> Vec<GameEvent> {
        self.events.drain(..).collect()
    }

    /// Pending event count
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True when nothing is pending
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Drop pending events
    pub fn clear(&mut self) {
        self.events.clear();
    }
}
