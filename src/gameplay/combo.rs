//! Combo and score multiplier tracking
//!
//! Every hit judgment extends the combo; a miss resets it. The multiplier
//! steps up at fixed combo thresholds (1×, 2×, 4×, 8×, 16×).

use super::constants::{COMBO_THRESHOLDS, MILESTONE_INTERVAL, MIN_MILESTONE_COMBO};
use super::Judgment;

/// State change caused by one judgment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComboResult {
    /// Combo after the judgment
    pub combo: u32,
    /// Multiplier after the judgment
    pub multiplier: u32,
    /// Combo just reached a milestone
    pub is_milestone: bool,
    /// A running combo was broken
    pub is_break: bool,
}

/// Running combo state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComboTracker {
    combo: u32,
    max_combo: u32,
}

impl ComboTracker {
    /// Fresh tracker at combo 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one judgment
    pub fn hit(&mut self, judgment: Judgment) -> ComboResult {
        if !judgment.is_hit() {
            return self.miss();
        }

        self.combo = self.combo.saturating_add(1);
        self.max_combo = self.max_combo.max(self.combo);

        ComboResult {
            combo: self.combo,
            multiplier: multiplier_for(self.combo),
            is_milestone: is_milestone(self.combo),
            is_break: false,
        }
    }

    /// Break the combo
    pub fn miss(&mut self) -> ComboResult {
        let was_running = self.combo > 0;
        self.combo = 0;

        ComboResult {
            combo: 0,
            multiplier: multiplier_for(0),
            is_milestone: false,
            is_break: was_running,
        }
    }

    /// Current combo
    pub fn combo(&self) -> u32 {
        self.combo
    }

    /// Longest combo since the last reset
    pub fn max_combo(&self) -> u32 {
        self.max_combo
    }

    /// Current multiplier
    pub fn multiplier(&self) -> u32 {
        multiplier_for(self.combo)
    }

    /// Back to combo 0 and max combo 0
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Multiplier for a combo count
pub fn multiplier_for(combo: u32) -> u32 {
    COMBO_THRESHOLDS
        .iter()
        .rev()
        .find(|&&(threshold, _)| combo >= threshold)
        .map_or(1, |&(_, multiplier)| multiplier)
}

/// True when `combo` deserves a celebration
///
/// Every multiplier threshold from 10 up, plus every multiple of 50.
pub fn is_milestone(combo: u32) -> bool {
    if combo < MIN_MILESTONE_COMBO {
        return false;
    }
    let is_threshold = COMBO_THRESHOLDS.iter().any(|&(threshold, _)| threshold == combo);
    is_threshold || (combo >= MILESTONE_INTERVAL && combo % MILESTONE_INTERVAL == 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiplier_steps() {
        assert_eq!(multiplier_for(0), 1);
        assert_eq!(multiplier_for(9), 1);
        assert_eq!(multiplier_for(10), 2);
        assert_eq!(multiplier_for(29), 2);
        assert_eq!(multiplier_for(30), 4);
        assert_eq!(multiplier_for(50), 8);
        assert_eq!(multiplier_for(99), 8);
        assert_eq!(multiplier_for(100), 16);
        assert_eq!(multiplier_for(5000), 16);
    }

    #[test]
    fn test_milestones() {
        assert!(!is_milestone(0));
        assert!(!is_milestone(5));
        assert!(is_milestone(10));
        assert!(!is_milestone(20));
        assert!(is_milestone(30));
        assert!(is_milestone(50));
        assert!(!is_milestone(75));
        assert!(is_milestone(100));
        assert!(is_milestone(150));
    }

    #[test]
    fn test_tenth_hit_doubles_multiplier() {
        let mut tracker = ComboTracker::new();
        for _ in 0..9 {
            let result = tracker.hit(Judgment::Perfect);
            assert!(!result.is_milestone);
        }
        let result = tracker.hit(Judgment::Good);
        assert_eq!(result.combo, 10);
        assert_eq!(result.multiplier, 2);
        assert!(result.is_milestone);
        assert!(!result.is_break);
    }

    #[test]
    fn test_miss_breaks_combo() {
        let mut tracker = ComboTracker::new();
        for _ in 0..12 {
            tracker.hit(Judgment::Great);
        }
        let result = tracker.hit(Judgment::Miss);
        assert_eq!(result.combo, 0);
        assert_eq!(result.multiplier, 1);
        assert!(result.is_break);
        assert_eq!(tracker.max_combo(), 12);

        let again = tracker.miss();
        assert!(!again.is_break, "Missing at combo 0 is not a break");
    }

    #[test]
    fn test_max_combo_is_monotonic() {
        let mut tracker = ComboTracker::new();
        for _ in 0..5 {
            tracker.hit(Judgment::Perfect);
        }
        tracker.miss();
        for _ in 0..3 {
            tracker.hit(Judgment::Perfect);
        }
        assert_eq!(tracker.combo(), 3);
        assert_eq!(tracker.max_combo(), 5);

        tracker.reset();
        assert_eq!(tracker.max_combo(), 0);
        assert_eq!(tracker.multiplier(), 1);
    }
}
