use std::path::Path;

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use anyhow::{anyhow, Context, Result};
use image::RgbaImage;
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use sha2::{Digest, Sha256};

use super::{Color, FontSpec, Surface, SurfaceSize, Transform};
use crate::geometry::ScreenRect;

/// Largest backing buffer we are willing to allocate, in pixels.
const MAX_BACKING_PIXELS: u64 = 16384 * 16384;

/// Surface backed by an RGBA pixel buffer at backing resolution.
///
/// Rectangles snap their edges to the nearest backing pixel. Label text is
/// rasterized only when a TrueType/OpenType font has been supplied; without
/// one, text is measured with fixed advances and not drawn.
pub struct RasterSurface {
    pixels: RgbaImage,
    size: SurfaceSize,
    transform: Transform,
    font: Option<FontArc>,
}

impl Default for RasterSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RasterSurface {
    pub fn new() -> Self {
        Self {
            pixels: RgbaImage::new(0, 0),
            size: SurfaceSize::default(),
            transform: Transform::identity(),
            font: None,
        }
    }

    pub fn with_font(mut self, font: FontArc) -> Self {
        self.font = Some(font);
        self
    }

    /// Load label font outlines from a font file.
    pub fn with_font_file<P: AsRef<Path>>(self, path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read font file {}", path.display()))?;
        let font = FontArc::try_from_vec(bytes)
            .map_err(|e| anyhow!("invalid font file {}: {}", path.display(), e))?;
        Ok(self.with_font(font))
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_pixels(self) -> RgbaImage {
        self.pixels
    }

    /// SHA-256 of the backing buffer (dimensions included), hex encoded.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.pixels.width().to_le_bytes());
        hasher.update(self.pixels.height().to_le_bytes());
        hasher.update(self.pixels.as_raw());
        hex::encode(hasher.finalize())
    }

    /// Write the buffer as PNG. An empty buffer (zero-sized layout) has
    /// nothing to encode; no file is written and `Ok(false)` is returned.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<bool> {
        let path = path.as_ref();
        if self.pixels.width() == 0 || self.pixels.height() == 0 {
            log::warn!(
                "overlay surface is empty ({}x{}), not writing {}",
                self.pixels.width(),
                self.pixels.height(),
                path.display()
            );
            return Ok(false);
        }
        self.pixels
            .save_with_format(path, image::ImageFormat::Png)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(true)
    }

    /// CSS rect to backing pixel bounds `[x0, y0, x1, y1)`, edges rounded and
    /// clipped to the buffer.
    fn backing_bounds(&self, rect: ScreenRect) -> Option<(i64, i64, i64, i64)> {
        let r = self.transform.apply_rect(rect);
        self.snap(r.x, r.y, r.right(), r.bottom())
    }

    fn snap(&self, x0: f64, y0: f64, x1: f64, y1: f64) -> Option<(i64, i64, i64, i64)> {
        let (w, h) = (self.pixels.width() as i64, self.pixels.height() as i64);
        let (lo_x, hi_x) = (x0.min(x1), x0.max(x1));
        let (lo_y, hi_y) = (y0.min(y1), y0.max(y1));
        let x0 = (lo_x.round() as i64).clamp(0, w);
        let y0 = (lo_y.round() as i64).clamp(0, h);
        let x1 = (hi_x.round() as i64).clamp(0, w);
        let y1 = (hi_y.round() as i64).clamp(0, h);
        (x1 > x0 && y1 > y0).then_some((x0, y0, x1, y1))
    }

    fn fill_bounds(&mut self, bounds: Option<(i64, i64, i64, i64)>, color: Color) {
        if let Some((x0, y0, x1, y1)) = bounds {
            let rect = Rect::at(x0 as i32, y0 as i32).of_size((x1 - x0) as u32, (y1 - y0) as u32);
            draw_filled_rect_mut(&mut self.pixels, rect, color.to_rgba());
        }
    }

    fn blend_bounds(&mut self, bounds: Option<(i64, i64, i64, i64)>, color: Color) {
        if color.a == 255 {
            self.fill_bounds(bounds, color);
            return;
        }
        let Some((x0, y0, x1, y1)) = bounds else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                let px = self.pixels.get_pixel_mut(x as u32, y as u32);
                *px = source_over(color, *px);
            }
        }
    }
}

/// Porter-Duff source-over of a straight-alpha color onto a pixel.
fn source_over(src: Color, dst: image::Rgba<u8>) -> image::Rgba<u8> {
    let sa = src.a as f32 / 255.0;
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return image::Rgba([0, 0, 0, 0]);
    }
    let mix = |s: u8, d: u8| {
        let v = (s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a;
        v.round().clamp(0.0, 255.0) as u8
    };
    image::Rgba([
        mix(src.r, dst[0]),
        mix(src.g, dst[1]),
        mix(src.b, dst[2]),
        (out_a * 255.0).round() as u8,
    ])
}

impl Surface for RasterSurface {
    fn resize(&mut self, size: SurfaceSize) -> Result<()> {
        let area = size.backing.width as u64 * size.backing.height as u64;
        if area > MAX_BACKING_PIXELS {
            // Drop the old contents so nothing stays registered to a stale layout.
            self.pixels = RgbaImage::new(0, 0);
            self.size = SurfaceSize::default();
            self.transform = Transform::identity();
            return Err(anyhow!(
                "backing surface {}x{} exceeds the {} pixel limit",
                size.backing.width,
                size.backing.height,
                MAX_BACKING_PIXELS
            ));
        }
        self.pixels = RgbaImage::new(size.backing.width, size.backing.height);
        self.size = size;
        self.transform = Transform::identity();
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
        let bounds = self.backing_bounds(rect);
        self.fill_bounds(bounds, Color::TRANSPARENT);
    }

    fn stroke_rect(&mut self, rect: ScreenRect, line_width: f64, color: Color) {
        let r = self.transform.apply_rect(rect);
        let half = self.transform.apply_len(line_width) / 2.0;
        let (ox0, oy0, ox1, oy1) = (r.x - half, r.y - half, r.right() + half, r.bottom() + half);
        let (ix0, iy0, ix1, iy1) = (r.x + half, r.y + half, r.right() - half, r.bottom() - half);

        if ix1 <= ix0 || iy1 <= iy0 {
            let bounds = self.snap(ox0, oy0, ox1, oy1);
            self.blend_bounds(bounds, color);
            return;
        }

        let bands = [
            self.snap(ox0, oy0, ox1, iy0),
            self.snap(ox0, iy1, ox1, oy1),
            self.snap(ox0, iy0, ix0, iy1),
            self.snap(ix1, iy0, ox1, iy1),
        ];
        for band in bands {
            self.blend_bounds(band, color);
        }
    }

    fn fill_rect(&mut self, rect: ScreenRect, color: Color) {
        let bounds = self.backing_bounds(rect);
        self.blend_bounds(bounds, color);
    }

    fn measure_text(&self, text: &str, font: &FontSpec) -> f64 {
        let Some(face) = &self.font else {
            return font.fallback_width(text);
        };
        let scaled = face.as_scaled(PxScale::from(font.size_px as f32));
        let mut width = 0.0f32;
        let mut prev = None;
        for ch in text.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(prev) = prev {
                width += scaled.kern(prev, id);
            }
            width += scaled.h_advance(id);
            prev = Some(id);
        }
        width as f64
    }

    fn fill_text(&mut self, text: &str, x: f64, baseline: f64, font: &FontSpec, color: Color) {
        let Some(face) = self.font.clone() else {
            return;
        };
        let px = self.transform.apply_len(font.size_px) as f32;
        if !(px > 0.0) {
            return;
        }
        let ascent = face.as_scaled(PxScale::from(px)).ascent() as f64;
        let (bx, bbase) = self.transform.apply_point(x, baseline);
        let top = bbase - ascent;
        draw_text_mut(
            &mut self.pixels,
            color.to_rgba(),
            bx.round() as i32,
            top.round() as i32,
            PxScale::from(px),
            &face,
            text,
        );
    }
}
