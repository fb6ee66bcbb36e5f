//! Game loop orchestration
//!
//! `GameEngine` ties the scheduler, note tracker, combo and scoring together.
//! The host owns the clock: it calls [`GameEngine::update`] once per frame with
//! the song position, forwards presses and releases, and drains
//! [`GameEvent`]s for presentation.
//!
//! # Example
//!
//! ```no_run
//! use beatlane::beatmap::{BeatMap, Lane};
//! use beatlane::gameplay::engine::GameEngine;
//!
//! let map = BeatMap { song_id: "demo".into(), bpm: 120.0, notes: Vec::new() };
//! let mut engine = GameEngine::new(map, "Demo", 30.0);
//! engine.start();
//! engine.update(1.0);
//! engine.handle_input(Lane::FIRST, 1.0);
//! for event in engine.drain_events() {
//!     println!("{:?}", event);
//! }
//! ```

use super::combo::ComboTracker;
use super::constants::{END_GAME_BUFFER, HOLD_TICK_SCORE, NEAR_MISS_WINDOW_MS};
use super::events::{EventQueue, GameEvent};
use super::note_tracker::{ActiveNote, NoteTracker, ReleaseOutcome};
use super::scheduler::NoteScheduler;
use super::scoring::{calculate_final_score, calculate_score};
use super::{GameScore, HitResult, Judgment};
use crate::beatmap::{BeatMap, Lane};

/// Where the engine is in a play-through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Loaded, waiting for `start`
    Ready,
    /// Accepting updates and input
    Playing,
    /// Frozen until `resume`
    Paused,
    /// Song over
    Finished,
}

/// One play-through of a beatmap
#[derive(Debug, Clone)]
pub struct GameEngine {
    beat_map: BeatMap,
    song_name: String,
    song_duration: f64,
    phase: GamePhase,
    current_time: f64,
    scheduler: NoteScheduler,
    tracker: NoteTracker,
    combo: ComboTracker,
    events: EventQueue,
    score: u64,
    hit_results: Vec<HitResult>,
}

impl GameEngine {
    /// Engine for `beat_map`, finishing two seconds after `song_duration`
    pub fn new(beat_map: BeatMap, song_name: &str, song_duration: f64) -> Self {
        let mut scheduler = NoteScheduler::new();
        scheduler.schedule_all(&beat_map.notes);
        let capacity = beat_map.len().min(64);

        Self {
            song_name: song_name.to_string(),
            song_duration,
            phase: GamePhase::Ready,
            current_time: 0.0,
            scheduler,
            tracker: NoteTracker::with_capacity(capacity),
            combo: ComboTracker::new(),
            events: EventQueue::new(),
            score: 0,
            hit_results: Vec::with_capacity(beat_map.len()),
            beat_map,
        }
    }

    /// Begin play from a clean state
    pub fn start(&mut self) {
        self.clear_state();
        self.phase = GamePhase::Playing;
        log::info!(
            "Starting '{}' ({} notes, {:.1}s)",
            self.song_name,
            self.beat_map.len(),
            self.song_duration
        );
    }

    /// Advance the game to song position `time`
    ///
    /// Spawns due notes, scores hold ticks, turns expired notes into misses
    /// and finishes the game once `time` reaches the song end plus two seconds.
    pub fn update(&mut self, time: f64) {
        if self.phase != GamePhase::Playing {
            return;
        }
        self.current_time = time;

        self.scheduler.spawn_due(time, &mut self.tracker);
        let update = self.tracker.update(time);

        if update.hold_ticks > 0 {
            let multiplier = u64::from(self.combo.multiplier());
            self.score += HOLD_TICK_SCORE * multiplier * u64::from(update.hold_ticks);
        }

        for missed in &update.missed {
            self.record_miss(missed);
        }

        for completed in &update.completed {
            self.events.push(GameEvent::HoldComplete {
                lane: completed.lane(),
            });
        }

        if time >= self.song_duration + END_GAME_BUFFER {
            self.phase = GamePhase::Finished;
            log::info!("'{}' finished with {} points", self.song_name, self.score);
        }
    }

    /// Handle a press on `lane` at `time`
    ///
    /// Returns the judgment when a note was hit. Otherwise a near-miss or
    /// ghost-press event is queued and `None` is returned.
    pub fn handle_input(&mut self, lane: Lane, time: f64) -> Option<HitResult> {
        if self.phase != GamePhase::Playing {
            return None;
        }

        let Some(mut result) = self.tracker.judge_hit(lane, time) else {
            let near = self
                .tracker
                .nearest_note_delta(lane, time)
                .map_or(false, |delta| delta.abs() <= NEAR_MISS_WINDOW_MS);
            self.events.push(if near {
                GameEvent::NearMiss { lane }
            } else {
                GameEvent::GhostPress { lane }
            });
            return None;
        };

        let combo = self.combo.hit(result.judgment);
        result.combo_at_hit = combo.combo;
        self.score += calculate_score(result.judgment, combo.multiplier);

        self.events.push(GameEvent::Hit {
            judgment: result.judgment,
            lane,
            combo: combo.combo,
            multiplier: combo.multiplier,
        });
        if combo.is_milestone {
            self.events.push(GameEvent::ComboMilestone { combo: combo.combo });
        }

        self.hit_results.push(result.clone());
        Some(result)
    }

    /// Handle a release on `lane` at `time`
    ///
    /// Releasing a hold early breaks the combo; the press that started the
    /// hold keeps its recorded judgment.
    pub fn handle_release(&mut self, lane: Lane, time: f64) {
        if self.phase != GamePhase::Playing {
            return;
        }

        match self.tracker.judge_release(lane, time) {
            Some(ReleaseOutcome::Complete) => {
                self.events.push(GameEvent::HoldComplete { lane });
            }
            Some(ReleaseOutcome::Miss) => {
                self.break_combo();
                self.events.push(GameEvent::HoldBroken { lane });
            }
            None => {}
        }
    }

    /// Freeze updates and input
    pub fn pause(&mut self) {
        if self.phase == GamePhase::Playing {
            self.phase = GamePhase::Paused;
        }
    }

    /// Continue after `pause`
    pub fn resume(&mut self) {
        if self.phase == GamePhase::Paused {
            self.phase = GamePhase::Playing;
        }
    }

    /// Throw away progress and return to `Ready`
    pub fn retry(&mut self) {
        self.clear_state();
        self.phase = GamePhase::Ready;
    }

    /// End the game and compute the final score
    ///
    /// Notes that were never judged count as misses.
    pub fn finish(&mut self) -> GameScore {
        self.phase = GamePhase::Finished;
        calculate_final_score(
            &self.beat_map.song_id,
            &self.song_name,
            self.beat_map.len(),
            &self.hit_results,
            self.combo.max_combo(),
            self.score,
        )
    }

    /// Take every event queued since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain()
    }

    /// Notes currently on screen
    pub fn active_notes(&self) -> impl Iterator<Item = &ActiveNote> {
        self.tracker.active_notes()
    }

    /// Current phase
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// True once the song is over
    pub fn is_finished(&self) -> bool {
        self.phase == GamePhase::Finished
    }

    /// Last song position passed to `update`
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Points so far
    pub fn score(&self) -> u64 {
        self.score
    }

    /// Current combo
    pub fn combo(&self) -> u32 {
        self.combo.combo()
    }

    /// Current multiplier
    pub fn multiplier(&self) -> u32 {
        self.combo.multiplier()
    }

    /// Longest combo so far
    pub fn max_combo(&self) -> u32 {
        self.combo.max_combo()
    }

    /// Judgments recorded so far, in judgment order
    pub fn hit_results(&self) -> &[HitResult] {
        &self.hit_results
    }

    /// The map being played
    pub fn beat_map(&self) -> &BeatMap {
        &self.beat_map
    }

    fn record_miss(&mut self, missed: &ActiveNote) {
        self.break_combo();
        self.hit_results.push(HitResult {
            note_id: missed.id(),
            judgment: Judgment::Miss,
            delta_ms: 0.0,
            combo_at_hit: 0,
        });
        self.events.push(GameEvent::Miss {
            lane: missed.lane(),
        });
    }

    fn break_combo(&mut self) {
        let previous_combo = self.combo.combo();
        if self.combo.miss().is_break {
            self.events.push(GameEvent::ComboBreak { previous_combo });
        }
    }

    fn clear_state(&mut self) {
        self.scheduler.reset();
        self.tracker.reset();
        self.combo.reset();
        self.events.clear();
        self.score = 0;
        self.hit_results.clear();
        self.current_time = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beatmap::{Note, NoteId, NoteKind};

    fn lane(index: u8) -> Lane {
        Lane::new(index).unwrap()
    }

    fn tap(id: u32, time: f64, lane_index: u8) -> Note {
        Note {
            id: NoteId(id),
            time,
            lane: lane(lane_index),
            kind: NoteKind::Normal,
            duration: None,
        }
    }

    fn engine(notes: Vec<Note>, duration: f64) -> GameEngine {
        let map = BeatMap {
            song_id: "test-song".to_string(),
            bpm: 120.0,
            notes,
        };
        let mut engine = GameEngine::new(map, "Test Song", duration);
        engine.start();
        engine
    }

    #[test]
    fn test_autoplay_all_perfect() {
        let notes: Vec<Note> = (0..20)
            .map(|i| tap(i, 1.0 + 0.5 * i as f64, (i % 4) as u8))
            .collect();
        let mut engine = engine(notes.clone(), 12.0);

        for note in &notes {
            engine.update(note.time);
            let result = engine.handle_input(note.lane, note.time).unwrap();
            assert_eq!(result.judgment, Judgment::Perfect);
        }

        assert_eq!(engine.combo(), 20);
        assert_eq!(engine.multiplier(), 2);
        assert_eq!(engine.score(), 9 * 300 + 11 * 600);

        engine.update(14.0);
        assert!(engine.is_finished());

        let score = engine.finish();
        assert_eq!(score.perfects, 20);
        assert_eq!(score.accuracy, 100.0);
        assert_eq!(score.grade, crate::gameplay::Grade::S);
        assert_eq!(score.max_combo, 20);
    }

    #[test]
    fn test_milestone_event_on_tenth_hit() {
        let notes: Vec<Note> = (0..10).map(|i| tap(i, 1.0 + 0.25 * i as f64, 0)).collect();
        let mut engine = engine(notes.clone(), 5.0);

        for note in &notes {
            engine.update(note.time);
            engine.handle_input(note.lane, note.time);
        }

        let events = engine.drain_events();
        assert_eq!(events.last(), Some(&GameEvent::ComboMilestone { combo: 10 }));
    }

    #[test]
    fn test_auto_miss_records_result() {
        let mut engine = engine(vec![tap(0, 1.0, 0)], 3.0);
        engine.update(0.5);
        engine.update(1.2);

        assert_eq!(engine.hit_results().len(), 1);
        assert_eq!(engine.hit_results()[0].judgment, Judgment::Miss);
        assert_eq!(engine.hit_results()[0].delta_ms, 0.0);

        let events = engine.drain_events();
        assert_eq!(events, vec![GameEvent::Miss { lane: lane(0) }]);
    }

    #[test]
    fn test_miss_breaks_running_combo() {
        let mut engine = engine(vec![tap(0, 1.0, 0), tap(1, 1.5, 1)], 3.0);
        engine.update(1.0);
        engine.handle_input(lane(0), 1.0).unwrap();
        engine.drain_events();

        engine.update(1.7);
        let events = engine.drain_events();
        assert!(events.contains(&GameEvent::ComboBreak { previous_combo: 1 }));
        assert!(events.contains(&GameEvent::Miss { lane: lane(1) }));
        assert_eq!(engine.combo(), 0);
        assert_eq!(engine.max_combo(), 1);
    }

    #[test]
    fn test_near_miss_and_ghost_press() {
        let mut engine = engine(vec![tap(0, 1.0, 2)], 3.0);
        engine.update(0.86);

        assert!(engine.handle_input(lane(2), 0.86).is_none());
        assert!(engine.handle_input(lane(2), 0.5).is_none());
        assert!(engine.handle_input(lane(1), 1.0).is_none());

        let events = engine.drain_events();
        assert_eq!(
            events,
            vec![
                GameEvent::NearMiss { lane: lane(2) },
                GameEvent::GhostPress { lane: lane(2) },
                GameEvent::GhostPress { lane: lane(1) },
            ]
        );
        assert_eq!(engine.active_notes().count(), 1);
    }

    #[test]
    fn test_hold_scores_ticks_and_completes() {
        let hold = Note {
            kind: NoteKind::Hold,
            duration: Some(0.5),
            ..tap(0, 1.0, 0)
        };
        let mut engine = engine(vec![hold], 3.0);

        engine.update(1.0);
        engine.handle_input(lane(0), 1.0).unwrap();
        engine.update(1.25);
        assert_eq!(engine.score(), 300 + 2 * HOLD_TICK_SCORE);

        engine.update(1.5);
        let events = engine.drain_events();
        assert!(events.contains(&GameEvent::HoldComplete { lane: lane(0) }));
        assert_eq!(engine.hit_results().len(), 1);
    }

    #[test]
    fn test_early_release_breaks_hold() {
        let hold = Note {
            kind: NoteKind::Hold,
            duration: Some(1.0),
            ..tap(0, 1.0, 3)
        };
        let mut engine = engine(vec![hold], 3.0);

        engine.update(1.0);
        engine.handle_input(lane(3), 1.0).unwrap();
        engine.drain_events();

        engine.handle_release(lane(3), 1.3);
        let events = engine.drain_events();
        assert_eq!(
            events,
            vec![
                GameEvent::ComboBreak { previous_combo: 1 },
                GameEvent::HoldBroken { lane: lane(3) },
            ]
        );
        assert_eq!(engine.combo(), 0);
        assert_eq!(engine.hit_results().len(), 1);
    }

    #[test]
    fn test_pause_freezes_game() {
        let mut engine = engine(vec![tap(0, 1.0, 0)], 3.0);
        engine.update(0.5);
        engine.pause();
        assert_eq!(engine.phase(), GamePhase::Paused);

        engine.update(5.0);
        assert!(engine.hit_results().is_empty());
        assert!(engine.handle_input(lane(0), 1.0).is_none());

        engine.resume();
        assert_eq!(engine.phase(), GamePhase::Playing);
        assert!(engine.handle_input(lane(0), 1.0).is_some());
    }

    #[test]
    fn test_retry_resets_progress() {
        let mut engine = engine(vec![tap(0, 1.0, 0)], 3.0);
        engine.update(1.0);
        engine.handle_input(lane(0), 1.0).unwrap();

        engine.retry();
        assert_eq!(engine.phase(), GamePhase::Ready);
        assert_eq!(engine.score(), 0);
        assert!(engine.hit_results().is_empty());
        assert!(engine.drain_events().is_empty());

        engine.start();
        engine.update(1.0);
        assert!(engine.handle_input(lane(0), 1.0).is_some());
    }

    #[test]
    fn test_input_ignored_before_start() {
        let map = BeatMap {
            song_id: "s".to_string(),
            bpm: 120.0,
            notes: vec![tap(0, 1.0, 0)],
        };
        let mut engine = GameEngine::new(map, "S", 3.0);
        engine.update(1.0);
        assert!(engine.handle_input(lane(0), 1.0).is_none());
        assert_eq!(engine.phase(), GamePhase::Ready);
    }

    #[test]
    fn test_finish_counts_unjudged_as_misses() {
        let mut engine = engine(vec![tap(0, 1.0, 0), tap(1, 10.0, 0)], 12.0);
        engine.update(1.0);
        engine.handle_input(lane(0), 1.0).unwrap();

        let score = engine.finish();
        assert_eq!(score.total_notes, 2);
        assert_eq!(score.misses, 1);
        assert!((score.accuracy - 50.0).abs() < 1e-9);
        assert!(engine.is_finished());
    }
}
