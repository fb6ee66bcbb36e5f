//! Configuration parameters for beat analysis

use std::time::Duration;

/// Analysis configuration parameters
///
/// The defaults are the tuned values the beatmap generator and the confidence
/// policy were calibrated against; changing them changes which songs fall
/// back to a tempo grid.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    // Onset envelope
    /// Frame size in samples (default: 1024)
    pub frame_size: usize,

    /// Hop size in samples (default: 256)
    pub hop_size: usize,

    /// Cutoff of the one-pole bass low-pass in Hz (default: 200.0)
    pub bass_cutoff_hz: f32,

    /// Half-width of the detrending window in frames (default: 16)
    pub detrend_window: usize,

    /// Fraction of the local mean removed when detrending (default: 0.9)
    pub detrend_factor: f32,

    // Tempo
    /// Minimum BPM to consider (default: 70.0)
    pub min_bpm: f32,

    /// Maximum BPM to consider (default: 190.0)
    pub max_bpm: f32,

    /// Prior used by the built-in coarse tempo guess (default: 120.0)
    pub prior_bpm: f32,

    // Beat tracking
    /// Penalty weight on log-lag deviation in the beat tracker (default: 22.0)
    pub tightness: f32,

    // Confidence policy
    /// Minimum tracked onsets before onset beats are trusted over a grid (default: 16)
    pub min_onset_count: usize,

    /// Confidence reported when there are too few onsets (default: 0.35)
    pub low_confidence: f32,

    // Worker
    /// Time budget for a background analysis (default: 30s)
    pub timeout: Duration,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            frame_size: 1024,
            hop_size: 256,
            bass_cutoff_hz: 200.0,
            detrend_window: 16,
            detrend_factor: 0.9,
            min_bpm: 70.0,
            max_bpm: 190.0,
            prior_bpm: 120.0,
            tightness: 22.0,
            min_onset_count: 16,
            low_confidence: 0.35,
            timeout: Duration::from_secs(30),
        }
    }
}
