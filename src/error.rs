//! Error types for beat analysis

use std::fmt;
use std::time::Duration;

/// Errors that can occur during beat analysis
///
/// Every variant is terminal for the analysis attempt that produced it: the
/// pipeline never hands back a partial [`BeatAnalysis`](crate::BeatAnalysis).
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Invalid input parameters (mismatched channel lengths, zero sample rate, ...)
    InvalidInput(String),

    /// The background worker or the coarse tempo detector failed
    WorkerFailed(String),

    /// The coarse tempo guess produced a non-finite or non-positive BPM
    InvalidBpm(f32),

    /// Analysis did not finish within the allotted time
    Timeout(Duration),

    /// Input samples contain NaN or infinite values
    NumericalError(String),
}

impl AnalysisError {
    /// Short machine-readable reason, stable across message wording changes
    pub fn reason(&self) -> &'static str {
        match self {
            AnalysisError::InvalidInput(_) => "invalid_input",
            AnalysisError::WorkerFailed(_) => "worker_failed",
            AnalysisError::InvalidBpm(_) => "invalid_bpm",
            AnalysisError::Timeout(_) => "timeout",
            AnalysisError::NumericalError(_) => "numerical",
        }
    }

    /// True if the attempt was abandoned because it ran out of time
    pub fn is_timeout(&self) -> bool {
        matches!(self, AnalysisError::Timeout(_))
    }
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AnalysisError::WorkerFailed(msg) => write!(f, "Analysis worker failed: {}", msg),
            AnalysisError::InvalidBpm(bpm) => write!(f, "Invalid BPM estimate: {}", bpm),
            AnalysisError::Timeout(limit) => {
                write!(f, "Analysis timed out after {:.1}s", limit.as_secs_f32())
            }
            AnalysisError::NumericalError(msg) => write!(f, "Numerical error: {}", msg),
        }
    }
}

impl std::error::Error for AnalysisError {}
