//! Beat analysis service
//!
//! Runs the full DSP pipeline over one decoded recording and reports progress
//! at fixed stages.
//!
//! # Pipeline
//!
//! ```text
//! samples → onset envelope → coarse tempo guess → tempo estimate
//!         → DP beat tracking → phase refinement → downbeat alignment
//!         → onset beats (≥ 16) or constant-tempo grid → confidence
//! ```
//!
//! # Example
//!
//! ```no_run
//! use beatlane::analysis::service::BeatAnalysisService;
//! use beatlane::{AnalysisConfig, AudioSamples};
//!
//! let samples = AudioSamples::from_mono(vec![0.0f32; 44100 * 30], 44100)?;
//! let service = BeatAnalysisService::new(AnalysisConfig::default());
//! let analysis = service.analyze(&samples, &mut |update| {
//!     println!("{} ({}%)", update.stage.label(), update.percent);
//! })?;
//! println!("{:.0} BPM, {} beats", analysis.bpm, analysis.beats.len());
//! # Ok::<(), beatlane::AnalysisError>(())
//! ```

use super::confidence::{compute_beat_alignment_confidence, score_confidence};
use super::result::BeatAnalysis;
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::features::beat_tracking::dynamic_programming::track_beats;
use crate::features::beat_tracking::grid::build_grid_beats;
use crate::features::beat_tracking::phase::{infer_downbeat_phase, refine_beat_phases};
use crate::features::onset::envelope::build_onset_envelope;
use crate::features::onset::OnsetEnvelope;
use crate::features::period::autocorrelation::estimate_tempo;
use crate::io::AudioSamples;
use std::time::Instant;

/// Pipeline stage reported through progress updates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalysisStage {
    /// Input validation
    Initializing,
    /// Onset envelope and coarse tempo guess
    Extracting,
    /// Envelope, tempo and beat tracking
    GeneratingBeatMap,
    /// Downbeat inference
    AligningDownbeats,
    /// Result assembly
    Finalizing,
}

impl AnalysisStage {
    /// Completion percentage reported when the stage starts
    pub fn percent(self) -> u8 {
        match self {
            AnalysisStage::Initializing => 10,
            AnalysisStage::Extracting => 20,
            AnalysisStage::GeneratingBeatMap => 60,
            AnalysisStage::AligningDownbeats => 80,
            AnalysisStage::Finalizing => 100,
        }
    }

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            AnalysisStage::Initializing => "Initializing analysis...",
            AnalysisStage::Extracting => "Extracting rhythm...",
            AnalysisStage::GeneratingBeatMap => "Generating beat map...",
            AnalysisStage::AligningDownbeats => "Aligning downbeats...",
            AnalysisStage::Finalizing => "Finalizing...",
        }
    }
}

/// One progress notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressUpdate {
    /// Stage that just started
    pub stage: AnalysisStage,
    /// Completion percentage (0-100)
    pub percent: u8,
}

impl From<AnalysisStage> for ProgressUpdate {
    fn from(stage: AnalysisStage) -> Self {
        Self {
            stage,
            percent: stage.percent(),
        }
    }
}

/// Rough tempo and first-beat offset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoarseTempo {
    /// Tempo guess in BPM
    pub bpm: f32,
    /// Time of the first beat in seconds
    pub offset: f64,
}

/// Source of the coarse tempo guess that seeds the pipeline
///
/// The guess is used as a soft prior for tempo estimation and, when onset
/// tracking finds too few beats, as the tempo of the fallback grid.
pub trait CoarseTempoDetector: Send + Sync {
    /// Guess tempo and offset for a recording
    ///
    /// `envelope` is the onset envelope the service built from `samples`; it
    /// is reused for the full tempo estimate afterwards.
    ///
    /// # Errors
    ///
    /// Implementations return `AnalysisError::WorkerFailed` (or any other
    /// variant) when no guess can be made; the analysis then fails.
    fn detect(
        &self,
        samples: &AudioSamples,
        envelope: &OnsetEnvelope,
    ) -> Result<CoarseTempo, AnalysisError>;
}

/// Built-in coarse guess: envelope autocorrelation around a fixed prior
///
/// The offset is the strongest onset within the first beat period.
#[derive(Debug, Clone)]
pub struct EnvelopeTempoGuess {
    config: AnalysisConfig,
}

impl EnvelopeTempoGuess {
    /// Guess with the prior and BPM range from `config`
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }
}

impl Default for EnvelopeTempoGuess {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

impl CoarseTempoDetector for EnvelopeTempoGuess {
    fn detect(
        &self,
        _samples: &AudioSamples,
        envelope: &OnsetEnvelope,
    ) -> Result<CoarseTempo, AnalysisError> {
        let prior = self.config.prior_bpm;
        if envelope.is_empty() {
            return Ok(CoarseTempo {
                bpm: prior,
                offset: 0.0,
            });
        }

        let tempo = estimate_tempo(envelope, prior, self.config.min_bpm, self.config.max_bpm);

        let first_period = tempo.best_lag.min(envelope.len());
        let mut offset_frame = 0;
        for frame in 1..first_period {
            if envelope.values[frame] > envelope.values[offset_frame] {
                offset_frame = frame;
            }
        }

        Ok(CoarseTempo {
            bpm: tempo.bpm,
            offset: envelope.frame_to_seconds(offset_frame),
        })
    }
}

/// Runs the beat analysis pipeline
pub struct BeatAnalysisService {
    config: AnalysisConfig,
    detector: Box<dyn CoarseTempoDetector>,
}

impl std::fmt::Debug for BeatAnalysisService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BeatAnalysisService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl BeatAnalysisService {
    /// Service using the built-in [`EnvelopeTempoGuess`]
    pub fn new(config: AnalysisConfig) -> Self {
        let detector = Box::new(EnvelopeTempoGuess::new(config.clone()));
        Self { config, detector }
    }

    /// Service with a custom coarse tempo detector
    pub fn with_detector(config: AnalysisConfig, detector: Box<dyn CoarseTempoDetector>) -> Self {
        Self { config, detector }
    }

    /// Configuration in use
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze a recording
    ///
    /// # Arguments
    ///
    /// * `samples` - Decoded audio
    /// * `on_progress` - Called once per stage, in order, ending at 100%
    ///
    /// # Returns
    ///
    /// `BeatAnalysis` with strictly increasing beats and confidence in `[0, 1]`
    ///
    /// # Errors
    ///
    /// - `AnalysisError::InvalidInput` for empty audio
    /// - `AnalysisError::NumericalError` if any sample is NaN or infinite
    /// - `AnalysisError::InvalidBpm` if the coarse guess is non-finite or non-positive
    /// - any error the coarse tempo detector returns
    pub fn analyze(
        &self,
        samples: &AudioSamples,
        on_progress: &mut dyn FnMut(ProgressUpdate),
    ) -> Result<BeatAnalysis, AnalysisError> {
        let start_time = Instant::now();
        let config = &self.config;

        on_progress(AnalysisStage::Initializing.into());
        if samples.is_empty() {
            return Err(AnalysisError::InvalidInput(
                "Empty audio samples".to_string(),
            ));
        }
        check_finite(samples)?;
        log::debug!(
            "Starting beat analysis: {} samples x {} channels at {} Hz",
            samples.len(),
            samples.channel_count(),
            samples.sample_rate()
        );

        on_progress(AnalysisStage::Extracting.into());
        let envelope = build_onset_envelope(samples, config);
        let coarse = self.detector.detect(samples, &envelope)?;
        if !coarse.bpm.is_finite() || coarse.bpm <= 0.0 {
            return Err(AnalysisError::InvalidBpm(coarse.bpm));
        }
        log::debug!(
            "Coarse tempo: {:.1} BPM, offset {:.3}s",
            coarse.bpm,
            coarse.offset
        );

        let tempo = estimate_tempo(&envelope, coarse.bpm, config.min_bpm, config.max_bpm);

        on_progress(AnalysisStage::GeneratingBeatMap.into());
        let tracked = track_beats(&envelope.values, tempo.best_lag, config.tightness);
        let refined = refine_beat_phases(&tracked.frames, &envelope.values, tempo.best_lag);

        on_progress(AnalysisStage::AligningDownbeats.into());
        let downbeat_phase = infer_downbeat_phase(&refined.strengths);
        let alignment = compute_beat_alignment_confidence(&envelope.values, &refined.frames);
        let aligned = refined.skip_leading(downbeat_phase);

        let onset_beats: Vec<f64> = aligned
            .frames
            .iter()
            .map(|&frame| envelope.frame_to_seconds(frame))
            .collect();
        let has_enough_onsets = onset_beats.len() >= config.min_onset_count;

        let analysis = if has_enough_onsets {
            BeatAnalysis {
                bpm: tempo.bpm,
                beats: onset_beats,
                confidence: score_confidence(true, tempo.clarity, alignment, config.low_confidence),
                beat_strengths: Some(aligned.strengths),
            }
        } else {
            log::warn!(
                "Only {} onset beats (need {}), falling back to a {:.1} BPM grid",
                onset_beats.len(),
                config.min_onset_count,
                coarse.bpm
            );
            BeatAnalysis {
                bpm: coarse.bpm,
                beats: build_grid_beats(
                    coarse.offset,
                    samples.duration_seconds(),
                    60.0 / coarse.bpm as f64,
                ),
                confidence: score_confidence(
                    false,
                    tempo.clarity,
                    alignment,
                    config.low_confidence,
                ),
                beat_strengths: None,
            }
        };

        on_progress(AnalysisStage::Finalizing.into());
        log::info!(
            "Beat analysis complete: {:.1} BPM, {} beats, confidence {:.2} (downbeat phase {}, {:.0} ms)",
            analysis.bpm,
            analysis.beats.len(),
            analysis.confidence,
            downbeat_phase,
            start_time.elapsed().as_secs_f64() * 1000.0
        );

        Ok(analysis)
    }
}

/// Reject recordings with NaN or infinite samples
fn check_finite(samples: &AudioSamples) -> Result<(), AnalysisError> {
    for (channel, values) in samples.channels().iter().enumerate() {
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(AnalysisError::NumericalError(format!(
                "{} at sample {} of channel {}",
                values[index], index, channel
            )));
        }
    }
    Ok(())
}
