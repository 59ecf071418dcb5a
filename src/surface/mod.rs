//! Drawing surfaces for the overlay.
//!
//! A surface behaves like a 2D canvas: it has a CSS size (what the page lays
//! out) and a backing resolution (the pixel buffer), related by the device
//! pixel ratio. Drawing calls are issued in CSS pixels and pass through the
//! current [`Transform`] on their way to backing pixels.
//!
//! - `RecordingSurface`: display list of primitives in backing pixels.
//! - `RasterSurface`: RGBA buffer rendered with `imageproc` and `ab_glyph`.

use anyhow::Result;

use crate::geometry::{CssSize, ScreenRect};

pub mod raster;
pub mod recording;

pub use raster::RasterSurface;
pub use recording::{DrawOp, RecordingSurface};

/// Average glyph advance, in ems, used when no font outlines are available.
pub const FALLBACK_ADVANCE_EM: f64 = 0.55;

/// Ratio of physical display pixels to CSS pixels. Always positive and finite.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DevicePixelRatio(f64);

impl DevicePixelRatio {
    /// Invalid ratios (zero, negative, NaN, infinite) fall back to 1.
    pub fn new(ratio: f64) -> Self {
        if ratio.is_finite() && ratio > 0.0 {
            Self(ratio)
        } else {
            log::warn!("invalid device pixel ratio {}, using 1", ratio);
            Self(1.0)
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for DevicePixelRatio {
    fn default() -> Self {
        Self(1.0)
    }
}

/// Integral pixel-buffer size of a surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BackingSize {
    pub width: u32,
    pub height: u32,
}

impl BackingSize {
    /// No pixels at all: one side is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// CSS size plus the backing resolution derived from it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SurfaceSize {
    pub css: CssSize,
    pub backing: BackingSize,
}

impl SurfaceSize {
    /// Size a surface for a layout box: CSS size as given, backing rounded to
    /// the nearest whole pixel after scaling by `dpr`.
    pub fn for_layout(css: CssSize, dpr: DevicePixelRatio) -> Self {
        let css = css.sanitized();
        let scale = |v: f64| (v * dpr.get()).round().min(u32::MAX as f64) as u32;
        Self {
            css,
            backing: BackingSize {
                width: scale(css.width),
                height: scale(css.height),
            },
        }
    }
}

/// Uniform scale from CSS units to backing pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub scale: f64,
}

impl Transform {
    pub fn identity() -> Self {
        Self { scale: 1.0 }
    }

    pub fn uniform(scale: f64) -> Self {
        Self { scale }
    }

    pub fn apply_len(&self, v: f64) -> f64 {
        v * self.scale
    }

    pub fn apply_point(&self, x: f64, y: f64) -> (f64, f64) {
        (x * self.scale, y * self.scale)
    }

    pub fn apply_rect(&self, rect: ScreenRect) -> ScreenRect {
        ScreenRect::new(
            rect.x * self.scale,
            rect.y * self.scale,
            rect.width * self.scale,
            rect.height * self.scale,
        )
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Straight-alpha RGBA color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const TRANSPARENT: Color = Color {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(value: &str) -> Option<Self> {
        let hex = value.trim().strip_prefix('#')?;
        if !matches!(hex.len(), 6 | 8) {
            return None;
        }
        let bytes = hex::decode(hex).ok()?;
        Some(Self {
            r: bytes[0],
            g: bytes[1],
            b: bytes[2],
            a: bytes.get(3).copied().unwrap_or(255),
        })
    }

    pub fn to_rgba(self) -> image::Rgba<u8> {
        image::Rgba([self.r, self.g, self.b, self.a])
    }
}

/// Font request for label text. Sizes are CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FontSpec {
    pub size_px: f64,
}

impl FontSpec {
    pub fn new(size_px: f64) -> Self {
        Self { size_px }
    }

    /// Width estimate when no outlines are available.
    pub fn fallback_width(&self, text: &str) -> f64 {
        text.chars().count() as f64 * self.size_px * FALLBACK_ADVANCE_EM
    }

    /// Ascent estimate when no outlines are available.
    pub fn fallback_ascent(&self) -> f64 {
        self.size_px * 0.8
    }
}

/// 2D drawing target.
///
/// Coordinates and lengths passed to drawing calls are CSS pixels; the current
/// transform maps them to backing pixels. Text is positioned by its left edge
/// and alphabetic baseline.
pub trait Surface {
    /// Adopt a new size. Discards contents and resets the transform.
    fn resize(&mut self, size: SurfaceSize) -> Result<()>;

    fn size(&self) -> SurfaceSize;

    fn set_transform(&mut self, transform: Transform);

    fn transform(&self) -> Transform;

    /// Reset pixels under `rect` to transparent.
    fn clear_rect(&mut self, rect: ScreenRect);

    /// Outline `rect` with a stroke of `line_width`, centered on the edges.
    fn stroke_rect(&mut self, rect: ScreenRect, line_width: f64, color: Color);

    fn fill_rect(&mut self, rect: ScreenRect, color: Color);

    /// Rendered width of `text` in CSS pixels.
    fn measure_text(&self, text: &str, font: &FontSpec) -> f64;

    fn fill_text(&mut self, text: &str, x: f64, baseline: f64, font: &FontSpec, color: Color);
}
