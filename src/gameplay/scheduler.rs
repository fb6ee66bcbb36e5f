//! Note spawning
//!
//! Hands notes to the tracker once their spawn time (`time - 2.0`) has
//! passed. Notes spawned late (after a seek, a hitch, or when the map starts
//! within the fall window) carry their initial fall progress so the renderer
//! can place them mid-screen.

use super::constants::NOTE_FALL_DURATION;
use super::note_tracker::NoteTracker;
use crate::beatmap::Note;

/// Time-ordered queue of notes waiting to spawn
#[derive(Debug, Clone, Default)]
pub struct NoteScheduler {
    pending: Vec<Note>,
    cursor: usize,
}

impl NoteScheduler {
    /// Empty scheduler
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the queue with `notes`, sorted by time
    pub fn schedule_all(&mut self, notes: &[Note]) {
        self.pending = notes.to_vec();
        self.pending.sort_by(|a, b| a.time.total_cmp(&b.time));
        self.cursor = 0;
    }

    /// Spawn every note whose spawn time is at or before `now`
    ///
    /// Returns the number of notes spawned.
    pub fn spawn_due(&mut self, now: f64, tracker: &mut NoteTracker) -> usize {
        let start = self.cursor;

        while let Some(note) = self.pending.get(self.cursor) {
            let spawn_time = note.time - NOTE_FALL_DURATION;
            if spawn_time > now {
                break;
            }

            let initial_progress = if now > spawn_time {
                Some(((now - spawn_time) / NOTE_FALL_DURATION).min(1.0))
            } else {
                None
            };
            tracker.spawn_note(note.clone(), initial_progress);
            self.cursor += 1;
        }

        let spawned = self.cursor - start;
        if spawned > 0 {
            log::trace!("Spawned {} notes at t={:.3}", spawned, now);
        }
        spawned
    }

    /// Notes not yet spawned
    pub fn remaining(&self) -> usize {
        self.pending.len() - self.cursor
    }

    /// Rewind so every note spawns again
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Drop every scheduled note
    pub fn clear(&mut self) {
        self.pending.clear();
        self.cursor = 0;
    }
}
