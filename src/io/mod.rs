//! Audio input modules
//!
//! Decoding is left to the host; this module only defines the planar sample
//! buffer the analysis pipeline consumes.

pub mod sample_buffer;

pub use sample_buffer::AudioSamples;
