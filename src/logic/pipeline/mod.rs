//! Detection Pipeline
//!
//! Bridges Camera -> Gate -> Detector -> Presenter.
//!
//! - `on_frame` chạy trên capture thread, không bao giờ block
//! - Detector chạy trên tokio blocking pool
//! - Kết quả gửi qua mpsc channel tới presenter (UI context)


use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::constants::END_INFERENCE_LABEL;
use super::capture::Frame;
use super::config::PipelineConfig;
use super::detection::{filter_detections, Detection};
use super::gate::{AdmissionGate, AdmissionPermit};
use super::inference::{Detector, InferenceError};
use super::telemetry::FrameTiming;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameDisposition {
    Submitted,
    Dropped,
}

/// How one admitted frame ended
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Detector returned (possibly empty) results
    Detections(Vec<Detection>),
    /// Detector error or worker fault
    Failed(InferenceError),
    /// Detector exceeded the configured timeout. The gate stays closed
    /// until the stalled call returns.
    TimedOut,
}

/// Delivered to the presenter for each admitted frame
#[derive(Debug, Clone)]
pub struct PipelineUpdate {
    pub frame_id: u64,
    pub captured_at: Duration,
    pub timing: FrameTiming,
    pub outcome: Outcome,
}

pub type UpdateReceiver = mpsc::UnboundedReceiver<PipelineUpdate>;

#[derive(Debug, Default)]
struct Counters {
    submitted: AtomicU64,
    dropped: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    timed_out: AtomicU64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PipelineStats {
    pub submitted: u64,
    pub dropped: u64,
    pub completed: u64,
    pub failed: u64,
    pub timed_out: u64,
    pub in_flight: bool,
}

// ============================================================================
// PIPELINE
// ============================================================================

pub struct Pipeline {
    session_id: Uuid,
    gate: AdmissionGate,
    detector: Arc<dyn Detector>,
    runtime: Handle,
    updates: mpsc::UnboundedSender<PipelineUpdate>,
    timeout: Option<Duration>,
    min_confidence: f32,
    counters: Arc<Counters>,
}

impl Pipeline {
    pub fn new(
        detector: Arc<dyn Detector>,
        config: &PipelineConfig,
        runtime: Handle,
    ) -> (Self, UpdateReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        let session_id = Uuid::new_v4();

        log::info!(
            "Pipeline {} ready (detector: {}, timeout: {:?}, min confidence: {})",
            session_id,
            detector.name(),
            config.inference_timeout(),
            config.min_confidence
        );

        let pipeline = Self {
            session_id,
            gate: AdmissionGate::new(),
            detector,
            runtime,
            updates: tx,
            timeout: config.inference_timeout(),
            min_confidence: config.min_confidence,
            counters: Arc::new(Counters::default()),
        };
        (pipeline, rx)
    }

    /// Offer a captured frame. Never blocks; drops the frame if busy.
    pub fn on_frame(&self, frame: Frame) -> FrameDisposition {
        let Some(permit) = self.gate.try_acquire() else {
            self.counters.dropped.fetch_add(1, Ordering::Relaxed);
            log::trace!("Frame #{} dropped (inference in flight)", frame.id);
            return FrameDisposition::Dropped;
        };

        self.counters.submitted.fetch_add(1, Ordering::Relaxed);

        let job = InferenceJob {
            permit,
            frame,
            timing: FrameTiming::start(),
            detector: self.detector.clone(),
            timeout: self.timeout,
            min_confidence: self.min_confidence,
            counters: self.counters.clone(),
            updates: self.updates.clone(),
        };
        self.runtime.spawn(job.run());

        FrameDisposition::Submitted
    }

    pub fn stats(&self) -> PipelineStats {
        PipelineStats {
            submitted: self.counters.submitted.load(Ordering::Relaxed),
            dropped: self.counters.dropped.load(Ordering::Relaxed),
            completed: self.counters.completed.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            timed_out: self.counters.timed_out.load(Ordering::Relaxed),
            in_flight: self.gate.is_in_flight(),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.gate.is_in_flight()
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn detector_name(&self) -> &str {
        self.detector.name()
    }
}

// ============================================================================
// INFERENCE JOB
// ============================================================================

/// Everything one admitted frame needs. The permit is handed to the blocking
/// detector call, so the gate opens again only once that call has returned
/// (or the job is dropped before it started).
struct InferenceJob {
    permit: AdmissionPermit,
    frame: Frame,
    timing: FrameTiming,
    detector: Arc<dyn Detector>,
    timeout: Option<Duration>,
    min_confidence: f32,
    counters: Arc<Counters>,
    updates: mpsc::UnboundedSender<PipelineUpdate>,
}

impl InferenceJob {
    async fn run(self) {
        let InferenceJob {
            permit,
            frame,
            mut timing,
            detector,
            timeout,
            min_confidence,
            counters,
            updates,
        } = self;

        let frame_id = frame.id;
        let captured_at = frame.timestamp;

        // The permit lives as long as the detector call itself. A timed-out
        // call keeps the gate closed until it really returns.
        let task = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            detector.detect(&frame)
        });
        let joined = match timeout {
            Some(limit) => tokio::time::timeout(limit, task).await.ok(),
            None => Some(task.await),
        };
        timing.label(END_INFERENCE_LABEL);

        let outcome = match joined {
            Some(Ok(Ok(detections))) => {
                let kept = filter_detections(detections, min_confidence);
                counters.completed.fetch_add(1, Ordering::Relaxed);
                Outcome::Detections(kept)
            }
            Some(Ok(Err(e))) => {
                counters.failed.fetch_add(1, Ordering::Relaxed);
                log::warn!("Frame #{}: {}", frame_id, e);
                Outcome::Failed(e)
            }
            Some(Err(join_err)) => {
                counters.failed.fetch_add(1, Ordering::Relaxed);
                log::error!("Frame #{}: inference worker failed: {}", frame_id, join_err);
                Outcome::Failed(InferenceError::Panicked)
            }
            None => {
                counters.timed_out.fetch_add(1, Ordering::Relaxed);
                log::warn!(
                    "Frame #{}: inference timed out after {:?}, frames dropped until it returns",
                    frame_id,
                    timeout
                );
                Outcome::TimedOut
            }
        };

        let update = PipelineUpdate {
            frame_id,
            captured_at,
            timing,
            outcome,
        };
        if updates.send(update).is_err() {
            log::debug!("Presenter gone, update for frame #{} discarded", frame_id);
        }
    }
}
