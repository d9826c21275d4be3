//! Presenter - UI-owning consumer of pipeline updates
//!
//! Mọi thay đổi state hiển thị (overlay, telemetry) đều đi qua đây,
//! trên một context duy nhất.

use super::config::ConfigError;
use super::overlay::{OverlaySink, TelemetryDisplay};
use super::pipeline::{Outcome, PipelineUpdate, UpdateReceiver};
use super::telemetry::{Measurement, PerformanceMeter, TelemetryBoard, TelemetrySnapshot};

pub struct Presenter {
    overlay: Box<dyn OverlaySink>,
    display: Box<dyn TelemetryDisplay>,
    meter: PerformanceMeter,
    board: TelemetryBoard,
    last_frame: Option<u64>,
    applied: u64,
}

impl Presenter {
    pub fn new(
        overlay: Box<dyn OverlaySink>,
        display: Box<dyn TelemetryDisplay>,
        smoothing_window: usize,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            overlay,
            display,
            meter: PerformanceMeter::new(),
            board: TelemetryBoard::new(smoothing_window)?,
            last_frame: None,
            applied: 0,
        })
    }

    /// Apply one update. Only successful inference touches the overlay;
    /// every outcome closes the frame's measurement.
    pub fn apply(&mut self, update: PipelineUpdate) -> Measurement {
        match &update.outcome {
            Outcome::Detections(detections) => {
                self.overlay.redraw(detections);
                self.last_frame = Some(update.frame_id);
                log::debug!(
                    "Frame #{} ({:?}): {} detections",
                    update.frame_id,
                    update.captured_at,
                    detections.len()
                );
            }
            Outcome::Failed(_) | Outcome::TimedOut => {
                log::debug!("Frame #{}: overlay unchanged", update.frame_id);
            }
        }

        let measurement = self.meter.stop(&update.timing);
        self.board.record(&measurement);
        self.display.show(&self.board.display_lines());
        self.applied += 1;
        measurement
    }

    /// Drain updates until every pipeline sender is gone
    pub async fn run(mut self, mut updates: UpdateReceiver) -> Self {
        while let Some(update) = updates.recv().await {
            self.apply(update);
        }
        log::info!("Presenter stopped after {} updates", self.applied);
        self
    }

    pub fn telemetry(&self) -> TelemetrySnapshot {
        self.board.snapshot()
    }

    pub fn board(&self) -> &TelemetryBoard {
        &self.board
    }

    /// Last frame whose detections reached the overlay
    pub fn last_frame(&self) -> Option<u64> {
        self.last_frame
    }

    pub fn applied(&self) -> u64 {
        self.applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::detection::{BoundingBox, Detection};
    use crate::logic::inference::InferenceError;
    use crate::logic::overlay::OverlayState;
    use crate::logic::telemetry::FrameTiming;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct CapturedLines(Arc<Mutex<Vec<[String; 3]>>>);

    impl TelemetryDisplay for CapturedLines {
        fn show(&mut self, lines: &[String; 3]) {
            self.0.lock().push(lines.clone());
        }
    }

    fn update(frame_id: u64, outcome: Outcome) -> PipelineUpdate {
        PipelineUpdate {
            frame_id,
            captured_at: Duration::ZERO,
            timing: FrameTiming::start(),
            outcome,
        }
    }

    fn presenter() -> (Presenter, OverlayState, CapturedLines) {
        let overlay = OverlayState::new();
        let lines = CapturedLines::default();
        let presenter =
            Presenter::new(Box::new(overlay.clone()), Box::new(lines.clone()), 10).unwrap();
        (presenter, overlay, lines)
    }

    #[test]
    fn test_detections_update_overlay() {
        let (mut presenter, overlay, lines) = presenter();
        let d = Detection::new("scratch", 0.9, BoundingBox::new(0.1, 0.1, 0.2, 0.2));

        presenter.apply(update(4, Outcome::Detections(vec![d.clone()])));

        assert_eq!(overlay.predictions(), vec![d]);
        assert_eq!(presenter.last_frame(), Some(4));
        assert_eq!(lines.0.lock().len(), 1);
    }

    #[test]
    fn test_failure_leaves_overlay_untouched() {
        let (mut presenter, overlay, lines) = presenter();
        let d = Detection::new("hole", 0.8, BoundingBox::new(0.3, 0.3, 0.1, 0.1));

        presenter.apply(update(1, Outcome::Detections(vec![d.clone()])));
        presenter.apply(update(2, Outcome::Failed(InferenceError::Failed("x".into()))));
        presenter.apply(update(3, Outcome::TimedOut));

        assert_eq!(overlay.predictions(), vec![d]);
        assert_eq!(overlay.redraws(), 1);
        assert_eq!(presenter.last_frame(), Some(1));
        // measurements still close for every frame
        assert_eq!(lines.0.lock().len(), 3);
        assert_eq!(presenter.applied(), 3);
    }

    #[test]
    fn test_empty_detections_clear_overlay() {
        let (mut presenter, overlay, _) = presenter();
        presenter.apply(update(
            1,
            Outcome::Detections(vec![Detection::new("x", 0.5, BoundingBox::default())]),
        ));
        presenter.apply(update(2, Outcome::Detections(Vec::new())));
        assert!(overlay.is_empty());
    }

    #[tokio::test]
    async fn test_run_drains_until_closed() {
        let (presenter, overlay, _) = presenter();
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();

        for id in 0..3 {
            tx.send(update(id, Outcome::Detections(Vec::new()))).unwrap();
        }
        drop(tx);

        let presenter = presenter.run(rx).await;
        assert_eq!(presenter.applied(), 3);
        assert_eq!(overlay.redraws(), 3);
        assert_eq!(presenter.telemetry().samples, 3);
    }
}
