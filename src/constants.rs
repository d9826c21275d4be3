//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! Every value can be overridden from the environment.

use std::path::PathBuf;

/// Default camera capture rate (frames per second)
pub const DEFAULT_TARGET_FPS: u32 = 30;

/// Default moving-average window for telemetry
pub const DEFAULT_SMOOTHING_WINDOW: usize = 10;

/// Default inference timeout (milliseconds). 0 disables the timeout.
pub const DEFAULT_INFERENCE_TIMEOUT_MS: u64 = 5_000;

/// Default minimum confidence for a detection to reach the overlay
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.0;

/// Default model bundle file name
pub const DEFAULT_MODEL_FILE: &str = "leather-defect-model.json";

/// Label used by the performance meter when inference returns
pub const END_INFERENCE_LABEL: &str = "endInference";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Leather Defect Detection";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get target capture fps from environment or use default
pub fn get_target_fps() -> u32 {
    std::env::var("DEFECT_TARGET_FPS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_TARGET_FPS)
}

/// Get smoothing window size from environment or use default
pub fn get_smoothing_window() -> usize {
    std::env::var("DEFECT_SMOOTHING_WINDOW")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SMOOTHING_WINDOW)
}

/// Get inference timeout from environment or use default
pub fn get_inference_timeout_ms() -> u64 {
    std::env::var("DEFECT_INFERENCE_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_INFERENCE_TIMEOUT_MS)
}

/// Get minimum detection confidence from environment or use default
pub fn get_min_confidence() -> f32 {
    std::env::var("DEFECT_MIN_CONFIDENCE")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_MIN_CONFIDENCE)
}

/// Get model bundle path from environment or use the per-user data dir
pub fn get_model_path() -> PathBuf {
    std::env::var("DEFECT_MODEL_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_model_path())
}

/// Expected SHA-256 of the model bundle, if pinned
pub fn get_model_sha256() -> Option<String> {
    std::env::var("DEFECT_MODEL_SHA256")
        .ok()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
}

fn default_model_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("leather-defect")
        .join(DEFAULT_MODEL_FILE)
}

/// Default demo run length (seconds)
pub const DEFAULT_RUN_SECONDS: u64 = 10;

/// Get demo run length from environment or use default
pub fn get_run_seconds() -> u64 {
    std::env::var("DEFECT_RUN_SECONDS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_RUN_SECONDS)
}

/// Check if the torch should be switched on at startup
pub fn is_torch_requested() -> bool {
    std::env::var("DEFECT_TORCH")
        .map(|s| s.eq_ignore_ascii_case("on") || s == "1" || s.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}
