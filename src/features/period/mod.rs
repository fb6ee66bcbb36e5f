//! Period estimation modules
//!
//! Convert the onset envelope into a global tempo:
//! - FFT autocorrelation with a soft tempo prior

pub mod autocorrelation;

/// Global tempo estimate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempoEstimate {
    /// Beat period in envelope frames
    pub best_lag: usize,

    /// Tempo in BPM (integer-valued, within the search range)
    pub bpm: f32,

    /// How much the winning period stands out (0.0-1.0)
    pub clarity: f32,
}
