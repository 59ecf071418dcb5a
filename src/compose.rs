//! Preview compositing: the image as the page would show it, with the overlay
//! on top, at backing resolution.

use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::geometry::DisplayGeometry;
use crate::surface::{Color, DevicePixelRatio, SurfaceSize};

/// Paint `image` contain-fitted into a buffer of `size.backing` pixels over a
/// solid `background`, using the same geometry the overlay was drawn with.
pub fn letterboxed_preview(
    image: &RgbaImage,
    geometry: &DisplayGeometry,
    size: SurfaceSize,
    dpr: DevicePixelRatio,
    background: Color,
) -> RgbaImage {
    let mut canvas =
        RgbaImage::from_pixel(size.backing.width, size.backing.height, background.to_rgba());
    if geometry.is_degenerate() || image.width() == 0 || image.height() == 0 {
        return canvas;
    }

    let content = geometry.content_rect();
    let scale = dpr.get();
    let width = (content.width * scale).round() as u32;
    let height = (content.height * scale).round() as u32;
    if width == 0 || height == 0 {
        return canvas;
    }

    let resized = imageops::resize(image, width, height, FilterType::Triangle);
    imageops::overlay(
        &mut canvas,
        &resized,
        (content.x * scale).round() as i64,
        (content.y * scale).round() as i64,
    );
    canvas
}

/// Alpha-blend `overlay` onto `base`, both at backing resolution.
pub fn composite_overlay(base: &mut RgbaImage, overlay: &RgbaImage) {
    imageops::overlay(base, overlay, 0, 0);
}
