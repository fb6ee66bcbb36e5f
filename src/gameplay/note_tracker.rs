//! Note lifecycle tracking and timing judgment
//!
//! Notes move through `Active → {Hit, Missed}` or, for holds,
//! `Active → Held → {Hit, Missed}`. Only Active and Held notes are stored;
//! a note leaves the tracker the moment it resolves.
//!
//! Storage is an arena of slots with a free list and an id → slot map, so
//! steady-state play does not allocate per frame.

use super::constants::{
    EARLY_RELEASE_TOLERANCE, GOOD_WINDOW_MS, HOLD_TICK_INTERVAL, NOTE_FALL_DURATION,
};
use super::{HitResult, Judgment};
use crate::beatmap::{Lane, Note, NoteId};
use std::collections::HashMap;

/// Lifecycle state of a tracked note
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoteState {
    /// Falling, waiting to be hit
    Active,
    /// Hold note being held down
    Held {
        /// Time the hold was pressed
        hold_start_time: f64,
        /// Hold ticks already reported
        last_tick_index: u32,
    },
    /// Resolved successfully
    Hit,
    /// Resolved as a miss
    Missed,
}

/// Runtime view of a spawned note
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveNote {
    /// The scheduled note
    pub note: Note,
    /// Lifecycle state
    pub state: NoteState,
    /// Time the note started falling (`time - 2.0`)
    pub spawn_time: f64,
    /// Fall progress (0-1) at spawn, for notes spawned late
    pub initial_progress: Option<f64>,
}

impl ActiveNote {
    /// Note id
    pub fn id(&self) -> NoteId {
        self.note.id
    }

    /// Note lane
    pub fn lane(&self) -> Lane {
        self.note.lane
    }

    /// True once resolved as hit
    pub fn is_hit(&self) -> bool {
        self.state == NoteState::Hit
    }

    /// True once resolved as missed
    pub fn is_missed(&self) -> bool {
        self.state == NoteState::Missed
    }

    /// True while a hold is being held
    pub fn is_held(&self) -> bool {
        matches!(self.state, NoteState::Held { .. })
    }

    /// Time the hold was pressed, if held
    pub fn hold_start_time(&self) -> Option<f64> {
        match self.state {
            NoteState::Held {
                hold_start_time, ..
            } => Some(hold_start_time),
            _ => None,
        }
    }

    /// Fall progress at `time`, 0 at spawn and 1 at the hit line
    pub fn progress(&self, time: f64) -> f64 {
        ((time - self.spawn_time) / NOTE_FALL_DURATION).max(0.0)
    }
}

/// Result of a release on a lane with a held note
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// Released too early; the hold is broken
    Miss,
    /// Held long enough
    Complete,
}

/// Everything that happened during one [`NoteTracker::update`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackerUpdate {
    /// New hold ticks across all held notes
    pub hold_ticks: u32,
    /// Notes that passed the good window unhit, by time
    pub missed: Vec<ActiveNote>,
    /// Holds that reached their end while held
    pub completed: Vec<ActiveNote>,
}

/// Tracks spawned notes and judges input against them
#[derive(Debug, Clone, Default)]
pub struct NoteTracker {
    slots: Vec<Option<ActiveNote>>,
    free: Vec<usize>,
    by_id: HashMap<NoteId, usize>,
}

impl NoteTracker {
    /// Empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracker with room for `capacity` simultaneous notes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::with_capacity(capacity),
            by_id: HashMap::with_capacity(capacity),
        }
    }

    /// Start tracking a note
    ///
    /// Re-spawning an id that is already tracked replaces it.
    pub fn spawn_note(&mut self, note: Note, initial_progress: Option<f64>) {
        let active = ActiveNote {
            spawn_time: note.time - NOTE_FALL_DURATION,
            state: NoteState::Active,
            initial_progress,
            note,
        };

        if let Some(&slot) = self.by_id.get(&active.id()) {
            self.slots[slot] = Some(active);
            return;
        }

        let id = active.id();
        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(active);
                slot
            }
            None => {
                self.slots.push(Some(active));
                self.slots.len() - 1
            }
        };
        self.by_id.insert(id, slot);
    }

    /// Advance to `current_time`
    ///
    /// Active notes more than 120 ms past their time become misses. Held notes
    /// complete at their end time; until then each full 100 ms since the press
    /// yields one hold tick.
    pub fn update(&mut self, current_time: f64) -> TrackerUpdate {
        let mut update = TrackerUpdate::default();
        let miss_after = GOOD_WINDOW_MS / 1000.0;

        for slot in 0..self.slots.len() {
            let Some(active) = self.slots[slot].as_mut() else {
                continue;
            };

            match active.state {
                NoteState::Held {
                    hold_start_time,
                    last_tick_index,
                } => {
                    if current_time >= active.note.end_time() {
                        active.state = NoteState::Hit;
                        if let Some(done) = self.release_slot(slot) {
                            update.completed.push(done);
                        }
                    } else {
                        let ticks = ((current_time - hold_start_time) / HOLD_TICK_INTERVAL)
                            .floor()
                            .max(0.0) as u32;
                        if ticks > last_tick_index {
                            update.hold_ticks += ticks - last_tick_index;
                            active.state = NoteState::Held {
                                hold_start_time,
                                last_tick_index: ticks,
                            };
                        }
                    }
                }
                NoteState::Active => {
                    if current_time > active.note.time + miss_after {
                        active.state = NoteState::Missed;
                        if let Some(missed) = self.release_slot(slot) {
                            update.missed.push(missed);
                        }
                    }
                }
                NoteState::Hit | NoteState::Missed => {}
            }
        }

        if update.missed.len() > 1 {
            update.missed.sort_by(|a, b| a.note.time.total_cmp(&b.note.time));
        }
        update
    }

    /// Judge a press on `lane` at `time`
    ///
    /// The nearest Active (not held) note in the lane is judged; on a tie the
    /// earlier note wins. Returns `None` when there is no such note or it is
    /// outside the good window, leaving the note untouched. A judged tap is
    /// removed; a judged hold becomes Held.
    pub fn judge_hit(&mut self, lane: Lane, time: f64) -> Option<HitResult> {
        let slot = self.nearest_active(lane, time)?;
        let active = self.slots[slot].as_mut()?;

        let delta_ms = offset_ms(time, active.note.time);
        let judgment = Judgment::from_offset_ms(delta_ms.abs())?;
        let note_id = active.id();

        if active.note.is_hold() {
            active.state = NoteState::Held {
                hold_start_time: time,
                last_tick_index: 0,
            };
        } else {
            active.state = NoteState::Hit;
            self.release_slot(slot);
        }

        Some(HitResult {
            note_id,
            judgment,
            delta_ms,
            combo_at_hit: 0,
        })
    }

    /// Judge a release on `lane` at `time`
    ///
    /// Returns `None` if nothing is held in the lane. Releasing more than
    /// 200 ms before the hold's end is a miss; otherwise the hold completes.
    /// Either way the note is removed.
    pub fn judge_release(&mut self, lane: Lane, time: f64) -> Option<ReleaseOutcome> {
        let slot = self.slots.iter().position(|slot| {
            slot.as_ref()
                .map_or(false, |active| active.lane() == lane && active.is_held())
        })?;
        let active = self.slots[slot].as_mut()?;

        let outcome = if active.note.end_time() - time > EARLY_RELEASE_TOLERANCE {
            active.state = NoteState::Missed;
            ReleaseOutcome::Miss
        } else {
            active.state = NoteState::Hit;
            ReleaseOutcome::Complete
        };
        self.release_slot(slot);
        Some(outcome)
    }

    /// Signed ms from the nearest Active note in `lane` to `time`
    pub fn nearest_note_delta(&self, lane: Lane, time: f64) -> Option<f64> {
        let slot = self.nearest_active(lane, time)?;
        let active = self.slots[slot].as_ref()?;
        Some(offset_ms(time, active.note.time))
    }

    /// Tracked notes, in no particular order
    pub fn active_notes(&self) -> impl Iterator<Item = &ActiveNote> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    /// Tracked note by id
    pub fn get(&self, id: NoteId) -> Option<&ActiveNote> {
        self.by_id
            .get(&id)
            .and_then(|&slot| self.slots.get(slot))
            .and_then(Option::as_ref)
    }

    /// Number of tracked notes
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// True when nothing is tracked
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Drop every tracked note, keeping allocated capacity
    pub fn reset(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.by_id.clear();
    }

    fn nearest_active(&self, lane: Lane, time: f64) -> Option<usize> {
        let mut best: Option<(usize, f64, f64)> = None;

        for (slot, active) in self.slots.iter().enumerate() {
            let Some(active) = active else {
                continue;
            };
            if active.state != NoteState::Active || active.lane() != lane {
                continue;
            }

            let distance = (time - active.note.time).abs();
            let closer = match best {
                None => true,
                Some((_, best_distance, best_time)) => {
                    distance < best_distance
                        || (distance == best_distance && active.note.time < best_time)
                }
            };
            if closer {
                best = Some((slot, distance, active.note.time));
            }
        }

        best.map(|(slot, _, _)| slot)
    }

    fn release_slot(&mut self, slot: usize) -> Option<ActiveNote> {
        let active = self.slots.get_mut(slot)?.take()?;
        self.by_id.remove(&active.id());
        self.free.push(slot);
        Some(active)
    }
}

/// Signed press offset in ms, rounded to 1e-6 ms so window edges stay inclusive
fn offset_ms(time: f64, note_time: f64) -> f64 {
    ((time - note_time) * 1000.0 * 1e6).round() / 1e6
}
