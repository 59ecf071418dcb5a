use anyhow::Result;

use super::{Color, FontSpec, Surface, SurfaceSize, Transform};
use crate::geometry::ScreenRect;

/// Primitive recorded by [`RecordingSurface`], in backing pixels.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Clear {
        rect: ScreenRect,
    },
    StrokeRect {
        rect: ScreenRect,
        line_width: f64,
        color: Color,
    },
    FillRect {
        rect: ScreenRect,
        color: Color,
    },
    Text {
        text: String,
        x: f64,
        baseline: f64,
        size_px: f64,
        color: Color,
    },
}

/// Surface that keeps a display list instead of pixels.
///
/// A clear covering the whole backing area drops everything recorded so far,
/// so `ops()` always describes what is visible.
#[derive(Clone, Debug, Default)]
pub struct RecordingSurface {
    size: SurfaceSize,
    transform: Transform,
    ops: Vec<DrawOp>,
    resizes: u64,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Drawn primitives, ignoring partial clears.
    pub fn primitives(&self) -> impl Iterator<Item = &DrawOp> {
        self.ops
            .iter()
            .filter(|op| !matches!(op, DrawOp::Clear { .. }))
    }

    pub fn stroked_rects(&self) -> Vec<ScreenRect> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::StrokeRect { rect, .. } => Some(*rect),
                _ => None,
            })
            .collect()
    }

    pub fn filled_rects(&self) -> Vec<ScreenRect> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::FillRect { rect, .. } => Some(*rect),
                _ => None,
            })
            .collect()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Number of `resize` calls so far.
    pub fn resizes(&self) -> u64 {
        self.resizes
    }

    /// Edges are rounded to whole backing pixels first, the way a raster
    /// target snaps them.
    fn covers_backing(&self, rect: &ScreenRect) -> bool {
        let backing = self.size.backing;
        rect.x.round() <= 0.0
            && rect.y.round() <= 0.0
            && rect.right().round() >= backing.width as f64
            && rect.bottom().round() >= backing.height as f64
    }
}

impl Surface for RecordingSurface {
    fn resize(&mut self, size: SurfaceSize) -> Result<()> {
        self.size = size;
        self.transform = Transform::identity();
        self.ops.clear();
        self.resizes += 1;
        Ok(())
    }

    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    fn transform(&self) -> Transform {
        self.transform
    }

    fn clear_rect(&mut self, rect: ScreenRect) {
        let rect = self.transform.apply_rect(rect);
        if self.covers_backing(&rect) {
            self.ops.clear();
        } else {
            self.ops.push(DrawOp::Clear { rect });
        }
    }

    fn stroke_rect(&mut self, rect: ScreenRect, line_width: f64, color: Color) {
        self.ops.push(DrawOp::StrokeRect {
            rect: self.transform.apply_rect(rect),
            line_width: self.transform.apply_len(line_width),
            color,
        });
    }

    fn fill_rect(&mut self, rect: ScreenRect, color: Color) {
        self.ops.push(DrawOp::FillRect {
            rect: self.transform.apply_rect(rect),
            color,
        });
    }

    fn measure_text(&self, text: &str, font: &FontSpec) -> f64 {
        font.fallback_width(text)
    }

    fn fill_text(&mut self, text: &str, x: f64, baseline: f64, font: &FontSpec, color: Color) {
        let (x, baseline) = self.transform.apply_point(x, baseline);
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            x,
            baseline,
            size_px: self.transform.apply_len(font.size_px),
            color,
        });
    }
}
