//! Detection Types
//!
//! Output of the inference collaborator, read-only for everything downstream.

use serde::{Deserialize, Serialize};

/// Normalized bounding box, all fields in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Clamp into the unit square. Non-finite coordinates become 0.
    pub fn clamped(self) -> Self {
        let unit = |v: f32| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
        let x = unit(self.x);
        let y = unit(self.y);
        Self {
            x,
            y,
            width: unit(self.width).min(1.0 - x),
            height: unit(self.height).min(1.0 - y),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    pub fn is_normalized(&self) -> bool {
        let unit = 0.0..=1.0;
        unit.contains(&self.x)
            && unit.contains(&self.y)
            && unit.contains(&self.width)
            && unit.contains(&self.height)
    }

    /// Text form used in the detection list, e.g. `(0.10, 0.20, 0.30, 0.40)`
    pub fn to_display_string(&self, digits: usize) -> String {
        format!(
            "({:.d$}, {:.d$}, {:.d$}, {:.d$})",
            self.x,
            self.y,
            self.width,
            self.height,
            d = digits
        )
    }
}

/// One recognized defect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Top label identifier (None if the model produced no label)
    pub label: Option<String>,
    /// Confidence of the top label, [0, 1]
    pub confidence: f32,
    pub bounding_box: BoundingBox,
}

impl Detection {
    pub fn new(label: impl Into<String>, confidence: f32, bounding_box: BoundingBox) -> Self {
        Self {
            label: Some(label.into()),
            confidence,
            bounding_box,
        }
    }
}

/// Row shown in the detection list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectionRow {
    pub title: String,
    pub detail: String,
}

impl From<&Detection> for DetectionRow {
    fn from(d: &Detection) -> Self {
        Self {
            title: d.label.clone().unwrap_or_else(|| "N/A".to_string()),
            detail: format!(
                "{}, {:.3}",
                d.bounding_box.to_display_string(2),
                d.confidence
            ),
        }
    }
}

/// Keep detections at or above `min_confidence`, boxes clamped to the frame.
/// Detections with a NaN or infinite confidence or box are dropped.
pub fn filter_detections(detections: Vec<Detection>, min_confidence: f32) -> Vec<Detection> {
    detections
        .into_iter()
        .filter(|d| {
            let finite = d.confidence.is_finite() && d.bounding_box.is_finite();
            if !finite {
                log::debug!("Discarding non-finite detection {:?}", d);
            }
            finite && d.confidence >= min_confidence
        })
        .map(|mut d| {
            d.bounding_box = d.bounding_box.clamped();
            debug_assert!(d.bounding_box.is_normalized(), "{:?}", d.bounding_box);
            d
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_formatting() {
        let d = Detection::new("scratch", 0.95, BoundingBox::new(0.1, 0.25, 0.333, 0.5));
        let row = DetectionRow::from(&d);

        assert_eq!(row.title, "scratch");
        assert_eq!(row.detail, "(0.10, 0.25, 0.33, 0.50), 0.950");
    }

    #[test]
    fn test_row_without_label() {
        let d = Detection {
            label: None,
            confidence: 0.5,
            bounding_box: BoundingBox::default(),
        };
        assert_eq!(DetectionRow::from(&d).title, "N/A");
    }

    #[test]
    fn test_clamped_box_stays_inside_frame() {
        let b = BoundingBox::new(0.8, -0.1, 0.5, 0.4).clamped();
        assert!(b.is_normalized());
        assert!((b.x + b.width) <= 1.0);
        assert_eq!(b.y, 0.0);
    }

    #[test]
    fn test_filter_by_confidence() {
        let detections = vec![
            Detection::new("hole", 0.9, BoundingBox::new(0.1, 0.1, 0.1, 0.1)),
            Detection::new("wrinkle", 0.2, BoundingBox::new(0.2, 0.2, 0.1, 0.1)),
        ];
        let kept = filter_detections(detections, 0.5);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].label.as_deref(), Some("hole"));
    }

    #[test]
    fn test_clamped_handles_non_finite() {
        let b = BoundingBox::new(f32::NAN, 0.5, f32::INFINITY, f32::NEG_INFINITY).clamped();
        assert!(b.is_finite());
        assert!(b.is_normalized());
        assert_eq!(b.x, 0.0);
        assert_eq!(b.width, 0.0);
    }

    #[test]
    fn test_filter_discards_non_finite() {
        let detections = vec![
            Detection::new("nan-box", 0.9, BoundingBox::new(f32::NAN, 0.1, 0.1, 0.1)),
            Detection::new("inf-box", 0.9, BoundingBox::new(0.1, 0.1, f32::INFINITY, 0.1)),
            Detection::new("nan-score", f32::NAN, BoundingBox::new(0.1, 0.1, 0.1, 0.1)),
            Detection::new("hole", 0.8, BoundingBox::new(0.9, 0.2, 0.3, 0.1)),
        ];
        let kept = filter_detections(detections, 0.0);

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].label.as_deref(), Some("hole"));
        assert!(kept[0].bounding_box.is_normalized());
        assert!((kept[0].bounding_box.width - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_filter_keeps_normalized_box_untouched() {
        let original = BoundingBox::new(0.1, 0.2, 0.3, 0.4);
        let kept = filter_detections(vec![Detection::new("scratch", 0.7, original)], 0.0);
        assert_eq!(kept[0].bounding_box, original);
    }
}
