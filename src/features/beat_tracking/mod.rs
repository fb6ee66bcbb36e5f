//! Beat tracking modules
//!
//! Turn the onset envelope and a tempo estimate into beat frames:
//! - Dynamic-programming beat tracker
//! - Phase refinement and downbeat inference
//! - Constant-tempo grid fallback

pub mod dynamic_programming;
pub mod grid;
pub mod phase;

/// Beat frames with the onset strength at each
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BeatSequence {
    /// Envelope frame indices, strictly increasing
    pub frames: Vec<usize>,

    /// Onset strength at each frame (parallel to `frames`)
    pub strengths: Vec<f32>,
}

impl BeatSequence {
    /// Number of beats
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// True if no beats were found
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Drop the first `count` beats (e.g. everything before the first downbeat)
    pub fn skip_leading(mut self, count: usize) -> Self {
        let count = count.min(self.frames.len());
        self.frames.drain(..count);
        self.strengths.drain(..count);
        self
    }
}
