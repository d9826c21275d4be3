use serde::{Serialize, Deserialize};

use crate::constants;
use crate::logic::detection::DetectionRow;
use crate::logic::inference::ModelMetadata;
use crate::logic::overlay::OverlayState;
use crate::logic::pipeline::{Pipeline, PipelineStats};
use crate::logic::telemetry::TelemetrySnapshot;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub app: String,
    pub version: String,
    pub session_id: String,

    pub model: ModelStatus,
    pub pipeline: PipelineStats,
    pub telemetry: Option<TelemetrySnapshot>,
    pub detections: Vec<DetectionRowStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelStatus {
    pub engine: String,
    pub model_version: Option<String>,
    pub sha256: Option<String>,
    pub loaded: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionRowStatus {
    pub title: String,
    pub detail: String,
}

impl From<DetectionRow> for DetectionRowStatus {
    fn from(row: DetectionRow) -> Self {
        Self {
            title: row.title,
            detail: row.detail,
        }
    }
}

pub fn collect(
    pipeline: &Pipeline,
    model: Option<&ModelMetadata>,
    overlay: &OverlayState,
    telemetry: Option<TelemetrySnapshot>,
) -> EngineStatus {
    let m_status = ModelStatus {
        engine: pipeline.detector_name().to_string(),
        model_version: model.and_then(|m| m.version.clone()),
        sha256: model.map(|m| m.sha256.clone()),
        loaded: model.is_some(),
    };

    EngineStatus {
        app: constants::APP_NAME.to_string(),
        version: constants::APP_VERSION.to_string(),
        session_id: pipeline.session_id().to_string(),
        model: m_status,
        pipeline: pipeline.stats(),
        telemetry,
        detections: overlay.rows().into_iter().map(Into::into).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::config::PipelineConfig;
    use crate::logic::detection::{BoundingBox, Detection};
    use crate::logic::inference::{Detector, InferenceError};
    use crate::logic::capture::Frame;
    use crate::logic::overlay::OverlaySink;
    use std::sync::Arc;

    struct Quiet;

    impl Detector for Quiet {
        fn detect(&self, _frame: &Frame) -> Result<Vec<Detection>, InferenceError> {
            Ok(Vec::new())
        }

        fn name(&self) -> &str {
            "quiet"
        }
    }

    #[tokio::test]
    async fn test_collect_serializes() {
        let (pipeline, _rx) = Pipeline::new(
            Arc::new(Quiet),
            &PipelineConfig::default(),
            tokio::runtime::Handle::current(),
        );
        let overlay = OverlayState::new();
        overlay.clone().redraw(&[Detection::new(
            "scratch",
            0.5,
            BoundingBox::new(0.0, 0.0, 1.0, 1.0),
        )]);

        let status = collect(&pipeline, None, &overlay, None);
        assert_eq!(status.model.engine, "quiet");
        assert!(!status.model.loaded);
        assert_eq!(status.detections.len(), 1);
        assert_eq!(status.detections[0].detail, "(0.00, 0.00, 1.00, 1.00), 0.500");

        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["pipeline"]["submitted"], 0);
        assert_eq!(json["session_id"], pipeline.session_id().to_string());
    }
}
