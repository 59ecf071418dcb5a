use anyhow::Result;

use super::result::Detection;

/// Object detector seam.
///
/// The overlay treats the model as a black box: pixels in, detections in
/// native pixel coordinates out. Implementations may ignore the pixels
/// entirely (replayed or fixed results).
pub trait DetectorBackend {
    /// Backend identifier.
    fn name(&self) -> &'static str;

    /// Run detection on an RGBA frame of `width` x `height` pixels.
    fn detect(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<Vec<Detection>>;

    /// One-time model load. Called before the first `detect`.
    fn warm_up(&mut self) -> Result<()> {
        Ok(())
    }
}
