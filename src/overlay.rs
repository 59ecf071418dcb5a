//! Overlay renderer.
//!
//! Holds the most recent detections and repaints them onto a [`Surface`] that
//! tracks the displayed image. Every redraw re-reads the image layout and the
//! device pixel ratio, so the same call serves both triggers: a finished
//! detection run and a layout change with no new detections.

use anyhow::Result;

use crate::detect::Detection;
use crate::frame::ImageSource;
use crate::geometry::{self, DisplayGeometry, GeometryError, ScreenRect};
use crate::surface::{Color, DevicePixelRatio, FontSpec, Surface, SurfaceSize, Transform};

pub const DEFAULT_LINE_WIDTH: f64 = 2.0;
pub const DEFAULT_FONT_PX: f64 = 16.0;
pub const DEFAULT_LABEL_HEIGHT: f64 = 18.0;
pub const DEFAULT_LABEL_PADDING: f64 = 8.0;
pub const DEFAULT_BASELINE_INSET: f64 = 4.0;

/// Visual parameters, all lengths in CSS pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayStyle {
    pub line_width: f64,
    pub font: FontSpec,
    /// Height of the label background.
    pub label_height: f64,
    /// Horizontal padding added to the measured text width, split evenly.
    pub label_padding: f64,
    /// Distance from the label background bottom up to the text baseline.
    pub baseline_inset: f64,
    pub box_color: Color,
    pub label_background: Color,
    pub label_text: Color,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            line_width: DEFAULT_LINE_WIDTH,
            font: FontSpec::new(DEFAULT_FONT_PX),
            label_height: DEFAULT_LABEL_HEIGHT,
            label_padding: DEFAULT_LABEL_PADDING,
            baseline_inset: DEFAULT_BASELINE_INSET,
            box_color: Color::BLACK,
            label_background: Color::BLACK,
            label_text: Color::WHITE,
        }
    }
}

/// What a redraw did.
#[derive(Clone, Debug, PartialEq)]
pub struct RedrawReport {
    pub size: SurfaceSize,
    pub geometry: DisplayGeometry,
    pub painted: usize,
    /// Detections skipped for non-finite coordinates or negative extents.
    pub rejected: usize,
}

/// Result of [`OverlayRenderer::redraw_or_skip`].
#[derive(Clone, Debug, PartialEq)]
pub enum RedrawOutcome {
    Drawn(RedrawReport),
    /// Image not decoded yet; the surface was left cleared.
    Skipped,
}

/// Owns the last known detections and paints them over the displayed image.
#[derive(Clone, Debug, Default)]
pub struct OverlayRenderer {
    detections: Vec<Detection>,
    style: OverlayStyle,
}

impl OverlayRenderer {
    pub fn new(style: OverlayStyle) -> Self {
        Self {
            detections: Vec::new(),
            style,
        }
    }

    pub fn style(&self) -> &OverlayStyle {
        &self.style
    }

    pub fn detections(&self) -> &[Detection] {
        &self.detections
    }

    /// Replace the stored detections. Does not draw.
    pub fn set_detections(&mut self, detections: Vec<Detection>) {
        self.detections = detections;
    }

    /// Forget the stored detections. The next redraw leaves an empty surface.
    pub fn clear_detections(&mut self) {
        self.detections.clear();
    }

    /// Detection-run trigger: store the new list, then redraw.
    pub fn on_detections_ready<I, S>(
        &mut self,
        detections: Vec<Detection>,
        image: &I,
        dpr: DevicePixelRatio,
        surface: &mut S,
    ) -> Result<RedrawReport>
    where
        I: ImageSource + ?Sized,
        S: Surface + ?Sized,
    {
        self.set_detections(detections);
        self.redraw(image, dpr, surface)
    }

    /// Layout-change trigger: redraw the stored detections against the
    /// current layout.
    pub fn on_layout_changed<I, S>(
        &self,
        image: &I,
        dpr: DevicePixelRatio,
        surface: &mut S,
    ) -> Result<RedrawOutcome>
    where
        I: ImageSource + ?Sized,
        S: Surface + ?Sized,
    {
        self.redraw_or_skip(image, dpr, surface)
    }

    /// Resize the surface to the image's layout box, clear it and paint every
    /// stored detection.
    ///
    /// Fails with [`GeometryError::InvalidDimensions`] (inside the
    /// `anyhow::Error`) when the image has no natural size yet. The surface is
    /// already resized and cleared at that point.
    pub fn redraw<I, S>(
        &self,
        image: &I,
        dpr: DevicePixelRatio,
        surface: &mut S,
    ) -> Result<RedrawReport>
    where
        I: ImageSource + ?Sized,
        S: Surface + ?Sized,
    {
        let layout = image.layout_box();
        let size = SurfaceSize::for_layout(layout, dpr);
        surface.resize(size)?;
        surface.set_transform(Transform::uniform(dpr.get()));
        surface.clear_rect(size.css.bounds());

        let (native_width, native_height) = image.natural_size();
        let geometry = geometry::resolve_in(native_width, native_height, size.css)?;

        let mut report = RedrawReport {
            size,
            geometry,
            painted: 0,
            rejected: 0,
        };
        if geometry.is_degenerate() {
            log::debug!(
                "overlay: empty layout box {}x{}, nothing to paint",
                size.css.width,
                size.css.height
            );
            return Ok(report);
        }

        for detection in &self.detections {
            if self.paint_detection(surface, &geometry, detection) {
                report.painted += 1;
            } else {
                report.rejected += 1;
            }
        }

        log::debug!(
            "overlay: painted {} of {} detections on {}x{} backing (scale {:.4}, offset {:.2},{:.2})",
            report.painted,
            self.detections.len(),
            size.backing.width,
            size.backing.height,
            geometry.scale,
            geometry.offset_x,
            geometry.offset_y
        );
        Ok(report)
    }

    /// [`redraw`](Self::redraw), treating an undecoded image as a no-op
    /// rather than an error.
    pub fn redraw_or_skip<I, S>(
        &self,
        image: &I,
        dpr: DevicePixelRatio,
        surface: &mut S,
    ) -> Result<RedrawOutcome>
    where
        I: ImageSource + ?Sized,
        S: Surface + ?Sized,
    {
        match self.redraw(image, dpr, surface) {
            Ok(report) => Ok(RedrawOutcome::Drawn(report)),
            Err(err) => match err.downcast_ref::<GeometryError>() {
                Some(geometry_err) => {
                    log::debug!("overlay: skipping paint pass: {}", geometry_err);
                    Ok(RedrawOutcome::Skipped)
                }
                None => Err(err),
            },
        }
    }

    fn paint_detection<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        geometry: &DisplayGeometry,
        detection: &Detection,
    ) -> bool {
        if !detection.is_paintable() {
            log::debug!(
                "overlay: rejecting malformed detection {:?} {:?}",
                detection.label,
                detection.bbox
            );
            return false;
        }

        let style = &self.style;
        let rect = geometry.map_rect(&detection.bbox);
        surface.stroke_rect(rect, style.line_width, style.box_color);

        let text = detection.label_text();
        let text_width = surface.measure_text(&text, &style.font);
        let label = label_rect(rect, text_width, style);
        surface.fill_rect(label, style.label_background);
        surface.fill_text(
            &text,
            label.x + style.label_padding / 2.0,
            label.bottom() - style.baseline_inset,
            &style.font,
            style.label_text,
        );
        true
    }
}

/// Label background sitting on top of `bbox`, pushed down to the surface top
/// when it would start above it. Only the top edge is clamped.
pub fn label_rect(bbox: ScreenRect, text_width: f64, style: &OverlayStyle) -> ScreenRect {
    let top = (bbox.y - style.label_height).max(0.0);
    ScreenRect::new(
        bbox.x,
        top,
        text_width + style.label_padding,
        style.label_height,
    )
}
