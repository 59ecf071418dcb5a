use serde::{Deserialize, Serialize};

use crate::geometry::NativeRect;

/// One detector output: class label, confidence and box in native pixels.
///
/// Serialized in the coco-ssd result shape:
/// `{"class": "cat", "score": 0.87, "bbox": [x, y, width, height]}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    #[serde(rename = "class")]
    pub label: String,
    pub score: f64,
    #[serde(rename = "bbox")]
    pub bbox: NativeRect,
}

impl Detection {
    pub fn new(label: impl Into<String>, score: f64, bbox: NativeRect) -> Self {
        Self {
            label: label.into(),
            score,
            bbox,
        }
    }

    /// Score clamped into [0, 1]; NaN and -0.0 read as 0.
    pub fn display_score(&self) -> f64 {
        if self.score.is_nan() {
            0.0
        } else {
            // + 0.0 turns -0.0 into 0.0 so labels never print "-0%".
            self.score.clamp(0.0, 1.0) + 0.0
        }
    }

    /// Overlay label, e.g. `"cat 87%"`.
    pub fn label_text(&self) -> String {
        format!("{} {}%", self.label, (self.display_score() * 100.0).round())
    }

    /// Side-list line, e.g. `"cat — 87.3%"`.
    pub fn summary_line(&self) -> String {
        format!("{} — {:.1}%", self.label, self.display_score() * 100.0)
    }

    /// Whether the box can be mapped and painted.
    pub fn is_paintable(&self) -> bool {
        self.bbox.is_well_formed()
    }
}
