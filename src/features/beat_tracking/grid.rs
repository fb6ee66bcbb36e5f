//! Constant-tempo beat grid
//!
//! Used when onset tracking finds too few beats to trust.

/// Evenly spaced beat times from `offset` up to (not including) `duration`
///
/// Times before zero are skipped. A non-positive interval yields no beats.
///
/// # Example
///
/// ```
/// use beatlane::features::beat_tracking::grid::build_grid_beats;
///
/// assert_eq!(build_grid_beats(0.5, 3.0, 1.0), vec![0.5, 1.5, 2.5]);
/// ```
pub fn build_grid_beats(offset: f64, duration: f64, interval: f64) -> Vec<f64> {
    if interval.is_nan() || interval <= 0.0 || !offset.is_finite() {
        log::warn!("Cannot build beat grid with interval {}", interval);
        return Vec::new();
    }

    let mut beats = Vec::new();
    let mut time = offset;
    while time < duration {
        if time >= 0.0 {
            beats.push(time);
        }
        time += interval;
    }
    beats
}
