//! Displayed image resource.
//!
//! The overlay never owns the image; it reads two things from it on every
//! redraw: the natural (decoded) pixel size and the box the image currently
//! occupies in the layout, in CSS pixels.

use image::RgbaImage;

use crate::geometry::CssSize;

/// What the overlay needs from the image it is drawn over.
pub trait ImageSource {
    /// Natural pixel size. `(0, 0)` until the image is decoded.
    fn natural_size(&self) -> (f64, f64);

    /// Current laid-out box in CSS pixels.
    fn layout_box(&self) -> CssSize;

    fn is_ready(&self) -> bool {
        let (w, h) = self.natural_size();
        w > 0.0 && h > 0.0
    }
}

/// An image as shown on screen: decoded pixels (if any) plus its layout box.
#[derive(Clone, Debug)]
pub struct DisplayedImage {
    pixels: Option<RgbaImage>,
    pub natural_width: u32,
    pub natural_height: u32,
    layout: CssSize,
}

impl DisplayedImage {
    /// Image element whose source has not finished decoding.
    pub fn pending(layout: CssSize) -> Self {
        Self {
            pixels: None,
            natural_width: 0,
            natural_height: 0,
            layout,
        }
    }

    pub fn from_rgba(pixels: RgbaImage, layout: CssSize) -> Self {
        let (natural_width, natural_height) = pixels.dimensions();
        Self {
            pixels: Some(pixels),
            natural_width,
            natural_height,
            layout,
        }
    }

    /// Dimensions only, no pixel data. Enough for geometry and painting.
    pub fn with_natural_size(natural_width: u32, natural_height: u32, layout: CssSize) -> Self {
        Self {
            pixels: None,
            natural_width,
            natural_height,
            layout,
        }
    }

    pub fn pixels(&self) -> Option<&RgbaImage> {
        self.pixels.as_ref()
    }

    /// Reflow: the element now occupies `layout`.
    pub fn set_layout(&mut self, layout: CssSize) {
        self.layout = layout;
    }

    /// Decode finished (or a new source was swapped in).
    pub fn set_pixels(&mut self, pixels: RgbaImage) {
        let (w, h) = pixels.dimensions();
        self.natural_width = w;
        self.natural_height = h;
        self.pixels = Some(pixels);
    }
}

impl ImageSource for DisplayedImage {
    fn natural_size(&self) -> (f64, f64) {
        (self.natural_width as f64, self.natural_height as f64)
    }

    fn layout_box(&self) -> CssSize {
        self.layout
    }
}
