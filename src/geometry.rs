//! Contain-fit geometry.
//!
//! Maps native image pixel coordinates onto the CSS pixel box an image is laid
//! out in when it is scaled uniformly to fit that box ("contain"). The image is
//! centered and the shorter axis is letterboxed, so the mapping is a single
//! uniform scale plus a per-axis offset.
//!
//! Everything here is pure and cheap; callers recompute geometry on every
//! redraw instead of caching it, because the layout box can change between
//! redraws.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in native image pixels, origin top-left.
///
/// Coordinates are passed through from the detector unclamped: `x`/`y` may be
/// negative or lie outside the image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct NativeRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl NativeRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// True when every component is finite and neither extent is negative.
    pub fn is_well_formed(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
            && self.width >= 0.0
            && self.height >= 0.0
    }
}

impl From<[f64; 4]> for NativeRect {
    fn from([x, y, width, height]: [f64; 4]) -> Self {
        Self::new(x, y, width, height)
    }
}

impl From<NativeRect> for [f64; 4] {
    fn from(rect: NativeRect) -> Self {
        [rect.x, rect.y, rect.width, rect.height]
    }
}

/// Rectangle in CSS pixels relative to the overlay surface origin.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScreenRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ScreenRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// Laid-out size of an element in CSS pixels. May be fractional.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CssSize {
    pub width: f64,
    pub height: f64,
}

impl CssSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Clamp negative or non-finite extents to zero.
    pub fn sanitized(self) -> Self {
        let clamp = |v: f64| if v.is_finite() && v > 0.0 { v } else { 0.0 };
        Self {
            width: clamp(self.width),
            height: clamp(self.height),
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    pub fn bounds(&self) -> ScreenRect {
        ScreenRect::new(0.0, 0.0, self.width, self.height)
    }
}

/// Errors raised while resolving geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GeometryError {
    /// Natural image size is zero, negative or not a number (image not decoded yet).
    InvalidDimensions { width: f64, height: f64 },
}

impl std::fmt::Display for GeometryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeometryError::InvalidDimensions { width, height } => write!(
                f,
                "invalid natural image dimensions {}x{} (image not decoded?)",
                width, height
            ),
        }
    }
}

impl std::error::Error for GeometryError {}

/// Scale and offsets mapping native pixels into the displayed CSS box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayGeometry {
    /// Uniform native-to-CSS scale. Zero when the displayed box is empty.
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub css_width: f64,
    pub css_height: f64,
    native_width: f64,
    native_height: f64,
}

impl DisplayGeometry {
    /// Nothing can be drawn: the displayed box has no area.
    pub fn is_degenerate(&self) -> bool {
        self.scale <= 0.0
    }

    pub fn rendered_width(&self) -> f64 {
        self.native_width * self.scale
    }

    pub fn rendered_height(&self) -> f64 {
        self.native_height * self.scale
    }

    /// Area the image actually covers inside the displayed box.
    pub fn content_rect(&self) -> ScreenRect {
        ScreenRect::new(
            self.offset_x,
            self.offset_y,
            self.rendered_width(),
            self.rendered_height(),
        )
    }

    pub fn map_point(&self, x: f64, y: f64) -> (f64, f64) {
        (
            x.mul_add(self.scale, self.offset_x),
            y.mul_add(self.scale, self.offset_y),
        )
    }

    pub fn map_rect(&self, rect: &NativeRect) -> ScreenRect {
        let (x, y) = self.map_point(rect.x, rect.y);
        ScreenRect::new(x, y, rect.width * self.scale, rect.height * self.scale)
    }
}

/// Resolve the contain-fit mapping for an image of `native_*` pixels laid out
/// in a box of `displayed_*` CSS pixels.
///
/// Negative or non-finite displayed sizes count as zero and produce a
/// degenerate (scale 0) geometry rather than an error.
pub fn resolve(
    native_width: f64,
    native_height: f64,
    displayed_width: f64,
    displayed_height: f64,
) -> Result<DisplayGeometry, GeometryError> {
    let valid = |v: f64| v.is_finite() && v > 0.0;
    if !valid(native_width) || !valid(native_height) {
        return Err(GeometryError::InvalidDimensions {
            width: native_width,
            height: native_height,
        });
    }

    let displayed = CssSize::new(displayed_width, displayed_height).sanitized();
    let scale = (displayed.width / native_width).min(displayed.height / native_height);
    let offset_x = (displayed.width - native_width * scale) / 2.0;
    let offset_y = (displayed.height - native_height * scale) / 2.0;

    Ok(DisplayGeometry {
        scale,
        offset_x,
        offset_y,
        css_width: displayed.width,
        css_height: displayed.height,
        native_width,
        native_height,
    })
}

/// [`resolve`] against a layout box.
pub fn resolve_in(
    native_width: f64,
    native_height: f64,
    layout: CssSize,
) -> Result<DisplayGeometry, GeometryError> {
    resolve(native_width, native_height, layout.width, layout.height)
}
