//! Leather Defect Detection - live frame pipeline core
//!
//! Admits camera frames into a single-flight detector, publishes detections
//! to an overlay and smooths latency/fps telemetry for display.

pub mod api;
pub mod constants;
pub mod logic;
