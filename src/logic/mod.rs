//! Logic Module - Frame pipeline & collaborators
//!
//! - `gate` / `smoother` - single-flight admission, moving average
//! - `pipeline` / `presenter` - Camera -> Detector -> UI flow
//! - `capture`, `inference`, `overlay`, `torch` - external collaborator seams

pub mod config;
pub mod gate;
pub mod smoother;
pub mod detection;
pub mod capture;
pub mod inference;
pub mod telemetry;
pub mod overlay;
pub mod torch;
pub mod pipeline;
pub mod presenter;

// Re-export common types
pub use config::{ConfigError, PipelineConfig};
pub use gate::{AdmissionGate, AdmissionPermit};
pub use smoother::MovingAverage;
pub use detection::{BoundingBox, Detection, DetectionRow};
pub use capture::{Frame, FrameSink, FrameSource, SyntheticCamera};
pub use inference::{Detector, InferenceError, ModelLoadError, ReplayDetector};
pub use pipeline::{FrameDisposition, Outcome, Pipeline, PipelineStats, PipelineUpdate};
pub use presenter::Presenter;
