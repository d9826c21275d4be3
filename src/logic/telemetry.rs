//! Performance Telemetry
//!
//! Per-frame timing (inference time, end-to-end execution time, fps) and the
//! smoothed values shown on screen.
//!
//! ## Flow
//! - `FrameTiming::start()` when a frame is admitted
//! - `timing.label(END_INFERENCE_LABEL)` when the detector returns
//! - `PerformanceMeter::stop(&timing)` once the overlay is updated
//! - `TelemetryBoard::record(&measurement)` feeds the moving averages

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::constants::END_INFERENCE_LABEL;
use super::config::ConfigError;
use super::smoother::MovingAverage;

// ============================================================================
// FRAME TIMING
// ============================================================================

/// Labeled timestamps for one admitted frame. Travels with the frame across threads.
#[derive(Debug, Clone)]
pub struct FrameTiming {
    started: Instant,
    marks: Vec<(&'static str, Instant)>,
}

impl FrameTiming {
    pub fn start() -> Self {
        Self::start_at(Instant::now())
    }

    pub fn start_at(started: Instant) -> Self {
        Self {
            started,
            marks: Vec::with_capacity(2),
        }
    }

    pub fn label(&mut self, name: &'static str) {
        self.label_at(name, Instant::now());
    }

    pub fn label_at(&mut self, name: &'static str, at: Instant) {
        self.marks.push((name, at));
    }

    /// Time from start to the first mark with this label
    pub fn until(&self, name: &str) -> Option<Duration> {
        self.marks
            .iter()
            .find(|(label, _)| *label == name)
            .map(|(_, at)| at.saturating_duration_since(self.started))
    }

    pub fn started(&self) -> Instant {
        self.started
    }
}

// ============================================================================
// PERFORMANCE METER
// ============================================================================

/// One completed frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub inference_ms: f64,
    pub execution_ms: f64,
    /// Frames completed within the trailing second, this one included
    pub fps: u32,
}

#[derive(Debug)]
pub struct PerformanceMeter {
    completions: VecDeque<Instant>,
    window: Duration,
}

impl Default for PerformanceMeter {
    fn default() -> Self {
        Self {
            completions: VecDeque::new(),
            window: Duration::from_secs(1),
        }
    }
}

impl PerformanceMeter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&mut self, timing: &FrameTiming) -> Measurement {
        self.stop_at(timing, Instant::now())
    }

    pub fn stop_at(&mut self, timing: &FrameTiming, now: Instant) -> Measurement {
        let execution = now.saturating_duration_since(timing.started());
        let inference = timing.until(END_INFERENCE_LABEL).unwrap_or(execution);

        self.completions.push_back(now);
        while let Some(&oldest) = self.completions.front() {
            if now.saturating_duration_since(oldest) >= self.window {
                self.completions.pop_front();
            } else {
                break;
            }
        }

        Measurement {
            inference_ms: inference.as_secs_f64() * 1000.0,
            execution_ms: execution.as_secs_f64() * 1000.0,
            fps: self.completions.len() as u32,
        }
    }
}

// ============================================================================
// TELEMETRY BOARD
// ============================================================================

/// Smoothed values for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub inference_ms: i64,
    pub execution_ms: i64,
    pub fps: i64,
    pub samples: usize,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone)]
pub struct TelemetryBoard {
    inference: MovingAverage,
    execution: MovingAverage,
    fps: MovingAverage,
}

impl Default for TelemetryBoard {
    fn default() -> Self {
        Self {
            inference: MovingAverage::default(),
            execution: MovingAverage::default(),
            fps: MovingAverage::default(),
        }
    }
}

impl TelemetryBoard {
    pub fn new(window: usize) -> Result<Self, ConfigError> {
        Ok(Self {
            inference: MovingAverage::new(window)?,
            execution: MovingAverage::new(window)?,
            fps: MovingAverage::new(window)?,
        })
    }

    /// Millisecond values are truncated to whole ms before smoothing
    pub fn record(&mut self, m: &Measurement) {
        self.inference.append(m.inference_ms as i64);
        self.execution.append(m.execution_ms as i64);
        self.fps.append(i64::from(m.fps));
    }

    pub fn inference_ms(&self) -> i64 {
        self.inference.average_value()
    }

    pub fn execution_ms(&self) -> i64 {
        self.execution.average_value()
    }

    pub fn fps(&self) -> i64 {
        self.fps.average_value()
    }

    /// The three on-screen labels
    pub fn display_lines(&self) -> [String; 3] {
        [
            format!("inference: {} ms", self.inference_ms()),
            format!("execution: {} ms", self.execution_ms()),
            format!("fps: {}", self.fps()),
        ]
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            inference_ms: self.inference_ms(),
            execution_ms: self.execution_ms(),
            fps: self.fps(),
            samples: self.fps.len(),
            updated_at: chrono::Utc::now(),
        }
    }
}
