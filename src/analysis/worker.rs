//! Background analysis worker
//!
//! Runs [`BeatAnalysisService::analyze`] on a dedicated thread so a game or
//! UI loop can keep running. Progress and the final result travel over one
//! `crossbeam-channel` queue that the caller polls.
//!
//! The only way to abandon a job is the timeout: once it expires `wait`
//! returns `AnalysisError::Timeout` and the thread's eventual result is
//! discarded. The timeout never falls back to a default tempo.
//!
//! # Example
//!
//! ```no_run
//! use beatlane::analysis::worker::analyze_in_background;
//! use beatlane::{AnalysisConfig, AudioSamples};
//!
//! let samples = AudioSamples::from_mono(vec![0.0f32; 44100 * 30], 44100)?;
//! let analysis = analyze_in_background(samples, AnalysisConfig::default())?;
//! println!("{:.0} BPM", analysis.bpm);
//! # Ok::<(), beatlane::AnalysisError>(())
//! ```

use super::result::BeatAnalysis;
use super::service::{BeatAnalysisService, ProgressUpdate};
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::io::AudioSamples;
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

enum WorkerMessage {
    Progress(ProgressUpdate),
    Finished(Result<BeatAnalysis, AnalysisError>),
}

/// Spawns analysis jobs on background threads
#[derive(Debug, Clone)]
pub struct AnalysisWorker {
    service: Arc<BeatAnalysisService>,
    timeout: Duration,
}

impl AnalysisWorker {
    /// Worker using the service's configured timeout
    pub fn new(service: BeatAnalysisService) -> Self {
        let timeout = service.config().timeout;
        Self {
            service: Arc::new(service),
            timeout,
        }
    }

    /// Override the time budget per job
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Start analysing `samples` on a new thread
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::WorkerFailed` if the thread cannot be spawned.
    pub fn spawn(&self, samples: AudioSamples) -> Result<AnalysisJob, AnalysisError> {
        let (tx, rx) = unbounded();
        let service = Arc::clone(&self.service);
        let started_at = Instant::now();

        let handle = thread::Builder::new()
            .name("beat-analysis".to_string())
            .spawn(move || {
                log::debug!("Analysis worker started");
                let progress_tx = tx.clone();
                let result = service.analyze(&samples, &mut |update| {
                    // Receiver may already be gone after a timeout
                    let _ = progress_tx.send(WorkerMessage::Progress(update));
                });
                if tx.send(WorkerMessage::Finished(result)).is_err() {
                    log::debug!("Analysis finished after its job was abandoned");
                }
            })
            .map_err(|e| AnalysisError::WorkerFailed(format!("Failed to spawn worker: {}", e)))?;

        Ok(AnalysisJob {
            rx,
            handle: Some(handle),
            started_at,
            timeout: self.timeout,
            buffered: Vec::new(),
            finished: None,
        })
    }
}

/// Handle to one running analysis
pub struct AnalysisJob {
    rx: Receiver<WorkerMessage>,
    handle: Option<JoinHandle<()>>,
    started_at: Instant,
    timeout: Duration,
    buffered: Vec<ProgressUpdate>,
    finished: Option<Result<BeatAnalysis, AnalysisError>>,
}

impl AnalysisJob {
    /// Progress updates received since the last poll, oldest first
    pub fn poll_progress(&mut self) -> Vec<ProgressUpdate> {
        self.drain_channel();
        std::mem::take(&mut self.buffered)
    }

    /// True once the result is available without blocking
    pub fn is_finished(&mut self) -> bool {
        self.drain_channel();
        self.finished.is_some()
    }

    fn drain_channel(&mut self) {
        for message in self.rx.try_iter() {
            match message {
                WorkerMessage::Progress(update) => self.buffered.push(update),
                WorkerMessage::Finished(result) => self.finished = Some(result),
            }
        }
    }

    /// Time left before the job times out
    pub fn remaining(&self) -> Duration {
        self.timeout.saturating_sub(self.started_at.elapsed())
    }

    /// Block until the analysis finishes or the timeout expires
    ///
    /// # Errors
    ///
    /// - `AnalysisError::Timeout` when the budget (measured from spawn) runs out
    /// - `AnalysisError::WorkerFailed` when the thread dies without a result
    /// - any error returned by the analysis itself
    pub fn wait(self) -> Result<BeatAnalysis, AnalysisError> {
        self.wait_with_progress(&mut |_| {})
    }

    /// Like [`wait`](Self::wait), forwarding progress updates as they arrive
    pub fn wait_with_progress(
        mut self,
        on_progress: &mut dyn FnMut(ProgressUpdate),
    ) -> Result<BeatAnalysis, AnalysisError> {
        for update in self.buffered.drain(..) {
            on_progress(update);
        }
        if let Some(result) = self.finished.take() {
            return result;
        }

        let deadline = self.started_at + self.timeout;
        loop {
            match self.rx.recv_deadline(deadline) {
                Ok(WorkerMessage::Progress(update)) => on_progress(update),
                Ok(WorkerMessage::Finished(result)) => {
                    if let Some(handle) = self.handle.take() {
                        let _ = handle.join();
                    }
                    return result;
                }
                Err(RecvTimeoutError::Timeout) => {
                    log::warn!(
                        "Beat analysis exceeded its {:.1}s budget",
                        self.timeout.as_secs_f32()
                    );
                    return Err(AnalysisError::Timeout(self.timeout));
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(self.failure());
                }
            }
        }
    }

    fn failure(&mut self) -> AnalysisError {
        let reason = match self.handle.take().map(JoinHandle::join) {
            Some(Err(payload)) => {
                if let Some(msg) = payload.downcast_ref::<&str>() {
                    (*msg).to_string()
                } else if let Some(msg) = payload.downcast_ref::<String>() {
                    msg.clone()
                } else {
                    "worker panicked".to_string()
                }
            }
            _ => "worker exited without a result".to_string(),
        };
        log::warn!("Beat analysis worker failed: {}", reason);
        AnalysisError::WorkerFailed(reason)
    }
}

/// Analyze on a background thread and wait for the result
///
/// # Errors
///
/// See [`AnalysisJob::wait`].
pub fn analyze_in_background(
    samples: AudioSamples,
    config: AnalysisConfig,
) -> Result<BeatAnalysis, AnalysisError> {
    AnalysisWorker::new(BeatAnalysisService::new(config))
        .spawn(samples)?
        .wait()
}
