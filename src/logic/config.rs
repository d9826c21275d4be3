//! Pipeline Configuration
//!
//! Gom các giá trị cấu hình từ `constants` thành một struct duy nhất.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Runtime configuration for capture, inference and telemetry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Camera capture rate
    pub target_fps: u32,

    /// Moving-average window for telemetry
    pub smoothing_window: usize,

    /// Inference timeout in ms (0 = wait forever)
    pub inference_timeout_ms: u64,

    /// Detections below this confidence never reach the overlay
    pub min_confidence: f32,

    /// Model bundle location
    pub model_path: PathBuf,

    /// Pinned SHA-256 of the model bundle (hex)
    pub model_sha256: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_fps: constants::DEFAULT_TARGET_FPS,
            smoothing_window: constants::DEFAULT_SMOOTHING_WINDOW,
            inference_timeout_ms: constants::DEFAULT_INFERENCE_TIMEOUT_MS,
            min_confidence: constants::DEFAULT_MIN_CONFIDENCE,
            model_path: PathBuf::from(constants::DEFAULT_MODEL_FILE),
            model_sha256: None,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            target_fps: constants::get_target_fps(),
            smoothing_window: constants::get_smoothing_window(),
            inference_timeout_ms: constants::get_inference_timeout_ms(),
            min_confidence: constants::get_min_confidence(),
            model_path: constants::get_model_path(),
            model_sha256: constants::get_model_sha256(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_fps == 0 {
            return Err(ConfigError::Invalid {
                key: "target_fps",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.smoothing_window == 0 {
            return Err(ConfigError::Invalid {
                key: "smoothing_window",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(ConfigError::Invalid {
                key: "min_confidence",
                reason: format!("{} is outside [0, 1]", self.min_confidence),
            });
        }
        Ok(())
    }

    pub fn inference_timeout(&self) -> Option<Duration> {
        match self.inference_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(self.target_fps.max(1)))
    }
}
