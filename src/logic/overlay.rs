//! Display Collaborators
//!
//! Overlay renderer and telemetry display. Both are driven only from the
//! presenter, which owns the UI context.

use std::sync::Arc;

use parking_lot::RwLock;

use super::detection::{Detection, DetectionRow};

/// Redraws bounding boxes for the latest detections
pub trait OverlaySink: Send {
    fn redraw(&mut self, detections: &[Detection]);
}

/// Shows the smoothed telemetry labels
pub trait TelemetryDisplay: Send {
    fn show(&mut self, lines: &[String; 3]);
}

// ============================================================================
// OVERLAY STATE
// ============================================================================

/// Latest predictions, readable from anywhere (detection list, status API)
#[derive(Debug, Clone, Default)]
pub struct OverlayState {
    inner: Arc<RwLock<OverlayInner>>,
}

#[derive(Debug, Default)]
struct OverlayInner {
    predictions: Vec<Detection>,
    redraws: u64,
}

impl OverlayState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn predictions(&self) -> Vec<Detection> {
        self.inner.read().predictions.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().predictions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().predictions.is_empty()
    }

    pub fn redraws(&self) -> u64 {
        self.inner.read().redraws
    }

    /// Rows for the detection list, in prediction order
    pub fn rows(&self) -> Vec<DetectionRow> {
        self.inner
            .read()
            .predictions
            .iter()
            .map(DetectionRow::from)
            .collect()
    }
}

impl OverlaySink for OverlayState {
    fn redraw(&mut self, detections: &[Detection]) {
        let mut inner = self.inner.write();
        inner.predictions = detections.to_vec();
        inner.redraws += 1;
    }
}

// ============================================================================
// LOG DISPLAY
// ============================================================================

/// Writes telemetry labels to the log every `every` updates
#[derive(Debug)]
pub struct LogTelemetryDisplay {
    every: u64,
    seen: u64,
}

impl LogTelemetryDisplay {
    pub fn new(every: u64) -> Self {
        Self { every: every.max(1), seen: 0 }
    }
}

impl TelemetryDisplay for LogTelemetryDisplay {
    fn show(&mut self, lines: &[String; 3]) {
        self.seen += 1;
        if self.seen % self.every == 0 {
            log::info!("{} | {} | {}", lines[0], lines[1], lines[2]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::detection::BoundingBox;

    #[test]
    fn test_redraw_replaces_predictions() {
        let state = OverlayState::new();
        let mut sink = state.clone();

        sink.redraw(&[
            Detection::new("scratch", 0.8, BoundingBox::new(0.0, 0.0, 0.5, 0.5)),
            Detection::new("hole", 0.7, BoundingBox::new(0.5, 0.5, 0.1, 0.1)),
        ]);
        assert_eq!(state.len(), 2);
        assert_eq!(state.rows()[1].title, "hole");

        sink.redraw(&[]);
        assert!(state.is_empty());
        assert_eq!(state.redraws(), 2);
    }
}
