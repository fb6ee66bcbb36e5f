//! # Beatlane
//!
//! Beat analysis, beatmap generation and timing judgment for four-lane rhythm
//! games.
//!
//! ## Features
//!
//! - **Beat Analysis**: Bass-weighted onset envelope, FFT autocorrelation tempo
//!   estimation and dynamic-programming beat tracking with phase refinement
//! - **Beatmap Generation**: Deterministic note charts for four difficulties,
//!   with triplets, off-beats and hold notes
//! - **Gameplay**: Millisecond judgment windows, combos, multipliers, hold
//!   ticks and final grading
//!
//! ## Quick Start
//!
//! ```no_run
//! use beatlane::{generate_beat_map, AnalysisConfig, AudioSamples, BeatAnalysisService};
//! use beatlane::beatmap::{Difficulty, GameMode};
//!
//! let samples = AudioSamples::from_mono(vec![0.0f32; 44100 * 30], 44100)?;
//! let service = BeatAnalysisService::new(AnalysisConfig::default());
//! let analysis = service.analyze(&samples, &mut |p| println!("{}%", p.percent))?;
//!
//! let map = generate_beat_map("song-1", &analysis, GameMode::Classic, Difficulty::Normal);
//! println!("{:.0} BPM, {} notes", analysis.bpm, map.len());
//! # Ok::<(), beatlane::AnalysisError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Audio → Mono mix → Band split → Onset envelope → Tempo → Beat tracking
//!       → Phase refinement → BeatAnalysis → BeatMap → GameEngine
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod beatmap;
pub mod config;
pub mod error;
pub mod features;
pub mod gameplay;
pub mod io;
pub mod preprocessing;

// Re-export main types
pub use analysis::result::BeatAnalysis;
pub use analysis::service::{AnalysisStage, BeatAnalysisService, ProgressUpdate};
pub use analysis::worker::{analyze_in_background, AnalysisJob, AnalysisWorker};
pub use beatmap::generator::{generate_all_difficulties, generate_beat_map};
pub use beatmap::{BeatMap, Difficulty, GameMode, Lane, Note};
pub use config::AnalysisConfig;
pub use error::AnalysisError;
pub use gameplay::engine::GameEngine;
pub use gameplay::{GameScore, Grade, HitResult, Judgment};
pub use io::AudioSamples;

/// Analyze samples on the calling thread
///
/// Shorthand for [`BeatAnalysisService::analyze`] without progress reporting.
///
/// # Errors
///
/// Returns `AnalysisError` if the input is empty or the tempo is unusable.
///
/// # Example
///
/// ```no_run
/// use beatlane::{analyze_audio, AnalysisConfig, AudioSamples};
///
/// let samples = AudioSamples::from_mono(vec![0.0f32; 44100 * 30], 44100)?;
/// let analysis = analyze_audio(&samples, AnalysisConfig::default())?;
/// # Ok::<(), beatlane::AnalysisError>(())
/// ```
pub fn analyze_audio(
    samples: &AudioSamples,
    config: AnalysisConfig,
) -> Result<BeatAnalysis, AnalysisError> {
    BeatAnalysisService::new(config).analyze(samples, &mut |_| {})
}
