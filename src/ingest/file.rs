//! Local image file source.

use std::path::Path;

use anyhow::{anyhow, Context, Result};

use crate::frame::DisplayedImage;
use crate::geometry::CssSize;

/// Decode a local image file and place it in a layout box of `layout` CSS
/// pixels.
pub fn load_image<P: AsRef<Path>>(path: P, layout: CssSize) -> Result<DisplayedImage> {
    let path = path.as_ref();
    let display = path.display().to_string();
    if !is_local_file_path(&display) {
        return Err(anyhow!(
            "image loading only supports local paths (no URL schemes): {}",
            display
        ));
    }

    let decoded = image::open(path).with_context(|| format!("failed to decode image {}", display))?;
    let pixels = decoded.to_rgba8();
    log::info!(
        "loaded image {} ({}x{})",
        display,
        pixels.width(),
        pixels.height()
    );
    Ok(DisplayedImage::from_rgba(pixels, layout))
}

pub fn is_local_file_path(path: &str) -> bool {
    if path.trim().is_empty() {
        return false;
    }
    !path.contains("://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::ImageSource;

    #[test]
    fn rejects_remote_and_empty_paths() {
        assert!(!is_local_file_path(""));
        assert!(!is_local_file_path("   "));
        assert!(!is_local_file_path("https://example.com/cat.jpg"));
        assert!(is_local_file_path("/tmp/cat.jpg"));
        assert!(is_local_file_path("images/cat.png"));
    }

    #[test]
    fn loads_png_with_natural_size() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("frame.png");
        image::RgbaImage::from_pixel(12, 7, image::Rgba([1, 2, 3, 255])).save(&path)?;

        let img = load_image(&path, CssSize::new(240.0, 140.0))?;
        assert_eq!(img.natural_size(), (12.0, 7.0));
        assert_eq!(img.layout_box(), CssSize::new(240.0, 140.0));
        assert!(img.pixels().is_some());
        Ok(())
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_image("/nonexistent/overlay.png", CssSize::new(1.0, 1.0)).unwrap_err();
        assert!(err.to_string().contains("failed to decode image"));
    }
}
