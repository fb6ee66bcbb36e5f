//! Decoded multi-channel PCM handed to the analysis pipeline

use crate::error::AnalysisError;

/// Decoded audio, one `Vec<f32>` per channel
///
/// Decoding itself happens outside the crate; whatever decoder the host uses
/// only has to produce planar `f32` channels of equal length.
#[derive(Debug, Clone)]
pub struct AudioSamples {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
    length: usize,
}

impl AudioSamples {
    /// Wrap planar channel data
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidInput` if the sample rate is zero or the
    /// channels differ in length.
    pub fn new(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self, AnalysisError> {
        if sample_rate == 0 {
            return Err(AnalysisError::InvalidInput(
                "Invalid sample rate: 0".to_string(),
            ));
        }

        let length = channels.first().map_or(0, Vec::len);
        if let Some((index, channel)) = channels
            .iter()
            .enumerate()
            .find(|(_, channel)| channel.len() != length)
        {
            return Err(AnalysisError::InvalidInput(format!(
                "Channel {} has {} samples, expected {}",
                index,
                channel.len(),
                length
            )));
        }

        Ok(Self {
            channels,
            sample_rate,
            length,
        })
    }

    /// Single-channel convenience constructor
    pub fn from_mono(samples: Vec<f32>, sample_rate: u32) -> Result<Self, AnalysisError> {
        Self::new(vec![samples], sample_rate)
    }

    /// De-interleave `[L, R, L, R, ...]` style data
    ///
    /// A trailing partial frame is dropped.
    pub fn from_interleaved(
        interleaved: &[f32],
        channel_count: usize,
        sample_rate: u32,
    ) -> Result<Self, AnalysisError> {
        if channel_count == 0 {
            return Self::new(Vec::new(), sample_rate);
        }

        let frames = interleaved.len() / channel_count;
        let mut channels = vec![Vec::with_capacity(frames); channel_count];
        for frame in interleaved.chunks_exact(channel_count) {
            for (channel, &sample) in channels.iter_mut().zip(frame) {
                channel.push(sample);
            }
        }

        Self::new(channels, sample_rate)
    }

    /// Planar channel data
    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Number of channels
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Samples per channel
    pub fn len(&self) -> usize {
        self.length
    }

    /// True when there is no audio to analyze
    pub fn is_empty(&self) -> bool {
        self.length == 0 || self.channels.is_empty()
    }

    /// Duration in seconds
    pub fn duration_seconds(&self) -> f64 {
        self.length as f64 / self.sample_rate as f64
    }

    /// Number of complete analysis frames for the given framing
    pub fn frame_count(&self, frame_size: usize, hop_size: usize) -> usize {
        if frame_size == 0 || hop_size == 0 || self.length < frame_size {
            return 0;
        }
        (self.length - frame_size) / hop_size + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_sample_rate() {
        assert!(AudioSamples::from_mono(vec![0.0; 16], 0).is_err());
    }

    #[test]
    fn test_rejects_ragged_channels() {
        let result = AudioSamples::new(vec![vec![0.0; 10], vec![0.0; 9]], 44100);
        assert!(matches!(result, Err(AnalysisError::InvalidInput(_))));
    }

    #[test]
    fn test_from_interleaved() {
        let samples =
            AudioSamples::from_interleaved(&[1.0, -1.0, 2.0, -2.0, 3.0], 2, 48000).unwrap();
        assert_eq!(samples.channel_count(), 2);
        assert_eq!(samples.len(), 2);
        assert_eq!(samples.channels()[0], vec![1.0, 2.0]);
        assert_eq!(samples.channels()[1], vec![-1.0, -2.0]);
    }

    #[test]
    fn test_frame_count() {
        let samples = AudioSamples::from_mono(vec![0.0; 2048], 44100).unwrap();
        assert_eq!(samples.frame_count(1024, 256), 5);
        assert_eq!(samples.frame_count(4096, 256), 0);
        assert!((samples.duration_seconds() - 2048.0 / 44100.0).abs() < 1e-12);
    }
}
