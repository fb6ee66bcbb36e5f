//! Onset detection modules
//!
//! Builds the onset-strength envelope every later stage works from:
//! - Bass energy + high-band flux envelope

pub mod envelope;

/// Per-frame onset strength series
///
/// Values are non-negative and standardized; one value per hop.
#[derive(Debug, Clone, PartialEq)]
pub struct OnsetEnvelope {
    /// Onset strength per frame
    pub values: Vec<f32>,

    /// Frames per second (`sample_rate / hop_size`)
    pub frame_rate: f32,
}

impl OnsetEnvelope {
    /// Envelope with no frames
    pub fn empty(frame_rate: f32) -> Self {
        Self {
            values: Vec::new(),
            frame_rate,
        }
    }

    /// Wrap precomputed values
    pub fn new(values: Vec<f32>, frame_rate: f32) -> Self {
        Self { values, frame_rate }
    }

    /// Number of frames
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if there are no frames
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Mean strength over all frames (0 when empty)
    pub fn mean(&self) -> f32 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().sum::<f32>() / self.values.len() as f32
    }

    /// Time in seconds of a frame index
    pub fn frame_to_seconds(&self, frame: usize) -> f64 {
        frame as f64 / self.frame_rate as f64
    }
}
