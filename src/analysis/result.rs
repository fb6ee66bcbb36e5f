//! Analysis result types

use serde::{Deserialize, Serialize};

/// Beat analysis of one recording
///
/// Produced once per song by [`BeatAnalysisService`](crate::analysis::service::BeatAnalysisService)
/// and consumed by the beatmap generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeatAnalysis {
    /// Global tempo in BPM
    pub bpm: f32,

    /// Beat times in seconds, strictly increasing
    pub beats: Vec<f64>,

    /// Overall trust in the beat grid (0.0-1.0)
    pub confidence: f32,

    /// Onset strength per beat, parallel to `beats`
    ///
    /// Only present when the beats came from onset tracking rather than the
    /// constant-tempo grid fallback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beat_strengths: Option<Vec<f32>>,
}

impl BeatAnalysis {
    /// Per-beat strengths, if present and parallel to `beats`
    pub fn strengths(&self) -> Option<&[f32]> {
        self.beat_strengths
            .as_deref()
            .filter(|strengths| strengths.len() == self.beats.len())
    }

    /// Seconds per beat at the analysed tempo (0 for a non-positive BPM)
    pub fn beat_interval(&self) -> f64 {
        if self.bpm > 0.0 {
            60.0 / self.bpm as f64
        } else {
            0.0
        }
    }
}
