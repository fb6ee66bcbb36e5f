//! Feature extraction modules
//!
//! This module contains the beat-analysis DSP stages:
//! - Onset envelope (bass energy + high-band flux)
//! - Period estimation (BPM detection)
//! - Beat tracking (dynamic programming + phase refinement)

pub mod beat_tracking;
pub mod onset;
pub mod period;
