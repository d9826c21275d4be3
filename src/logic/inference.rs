//! Inference Collaborator
//!
//! `Detector` là seam cho ML runtime thật (Core ML, ONNX, ...).
//! `ReplayDetector` nạp một model bundle JSON chứa các detection đã ghi sẵn,
//! dùng cho demo và test.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::capture::Frame;
use super::detection::Detection;

// ============================================================================
// ERRORS
// ============================================================================

/// Model could not be loaded. Fatal at startup.
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("model not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read model {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid model bundle {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("checksum mismatch for {path}: expected {expected}, got {actual}")]
    Checksum {
        path: PathBuf,
        expected: String,
        actual: String,
    },
}

/// A single inference failed. Recovered locally; the next frame proceeds.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InferenceError {
    #[error("model not loaded")]
    NotLoaded,

    #[error("inference failed: {0}")]
    Failed(String),

    #[error("inference worker panicked")]
    Panicked,
}

// ============================================================================
// DETECTOR TRAIT
// ============================================================================

/// Trait cho inference engines. Called from the blocking pool, one frame at a time.
pub trait Detector: Send + Sync {
    fn detect(&self, frame: &Frame) -> Result<Vec<Detection>, InferenceError>;

    /// Human-readable engine name for status output
    fn name(&self) -> &str {
        "detector"
    }
}

// ============================================================================
// MODEL BUNDLE
// ============================================================================

/// On-disk model bundle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelBundle {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    /// Simulated per-frame latency
    #[serde(default)]
    pub latency_ms: u64,
    /// Detections returned per frame, cycled in order
    pub frames: Vec<Vec<Detection>>,
}

/// Metadata kept after loading
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub name: String,
    pub version: Option<String>,
    pub path: String,
    pub sha256: String,
    pub labels: Vec<String>,
    pub loaded_at: chrono::DateTime<chrono::Utc>,
}

/// Hex SHA-256 of a byte slice
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

// ============================================================================
// REPLAY DETECTOR
// ============================================================================

pub struct ReplayDetector {
    metadata: ModelMetadata,
    frames: Vec<Vec<Detection>>,
    latency: Duration,
    cursor: AtomicUsize,
    calls: AtomicU64,
}

impl ReplayDetector {
    /// Load a model bundle from disk, optionally pinning its checksum
    pub fn load(path: &Path, expected_sha256: Option<&str>) -> Result<Self, ModelLoadError> {
        log::info!("Loading model bundle from: {}", path.display());

        if !path.exists() {
            return Err(ModelLoadError::NotFound(path.to_path_buf()));
        }

        let bytes = std::fs::read(path).map_err(|source| ModelLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let actual = sha256_hex(&bytes);
        if let Some(expected) = expected_sha256 {
            if !expected.eq_ignore_ascii_case(&actual) {
                return Err(ModelLoadError::Checksum {
                    path: path.to_path_buf(),
                    expected: expected.to_string(),
                    actual,
                });
            }
        }

        let bundle: ModelBundle =
            serde_json::from_slice(&bytes).map_err(|source| ModelLoadError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        log::info!(
            "Model '{}' loaded ({} recorded frames, sha256 {})",
            bundle.name,
            bundle.frames.len(),
            &actual[..12]
        );

        let metadata = ModelMetadata {
            name: bundle.name.clone(),
            version: bundle.version.clone(),
            path: path.display().to_string(),
            sha256: actual,
            labels: bundle.labels.clone(),
            loaded_at: chrono::Utc::now(),
        };

        Ok(Self::from_bundle(bundle, metadata))
    }

    fn from_bundle(bundle: ModelBundle, metadata: ModelMetadata) -> Self {
        Self {
            metadata,
            frames: bundle.frames,
            latency: Duration::from_millis(bundle.latency_ms),
            cursor: AtomicUsize::new(0),
            calls: AtomicU64::new(0),
        }
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }
}

impl Detector for ReplayDetector {
    fn detect(&self, frame: &Frame) -> Result<Vec<Detection>, InferenceError> {
        self.calls.fetch_add(1, Ordering::Relaxed);

        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }

        if self.frames.is_empty() {
            return Ok(Vec::new());
        }

        let idx = self.cursor.fetch_add(1, Ordering::Relaxed) % self.frames.len();
        log::trace!(
            "Replaying recorded frame {} for frame #{} ({}x{}, {} bytes)",
            idx,
            frame.id,
            frame.width,
            frame.height,
            frame.byte_len()
        );
        Ok(self.frames[idx].clone())
    }

    fn name(&self) -> &str {
        &self.metadata.name
    }
}
