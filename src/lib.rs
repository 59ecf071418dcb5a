//! Detection overlay
//!
//! Draws object-detection results over an image that is displayed with
//! "contain" fit (uniform scale, centered, letterboxed on one axis), keeping
//! every box registered with the object underneath it across device pixel
//! ratios, resizes and repeated redraws.
//!
//! # Architecture
//!
//! - `geometry`: pure contain-fit resolver, native pixels to CSS pixels.
//! - `overlay`: renderer that owns the last detections and repaints them.
//! - `surface`: canvas-like drawing targets (display list, RGBA raster).
//! - `frame`: the displayed image the overlay reads natural size and layout from.
//! - `detect`: detection records, the detector seam and result filtering.
//! - `ingest`, `compose`, `config`: local image loading, preview compositing
//!   and runtime configuration for the command-line front end.
//!
//! Everything runs synchronously on the caller's thread. A redraw always
//! re-reads the current layout, so the two triggers (new detections, layout
//! change) may arrive in any order.

pub mod compose;
pub mod config;
pub mod detect;
pub mod frame;
pub mod geometry;
pub mod ingest;
pub mod overlay;
pub mod surface;

pub use detect::{Detection, DetectionFilter, DetectorBackend, JsonFileBackend, StubBackend};
pub use frame::{DisplayedImage, ImageSource};
pub use geometry::{
    resolve, resolve_in, CssSize, DisplayGeometry, GeometryError, NativeRect, ScreenRect,
};
pub use overlay::{label_rect, OverlayRenderer, OverlayStyle, RedrawOutcome, RedrawReport};
pub use surface::{
    BackingSize, Color, DevicePixelRatio, DrawOp, FontSpec, RasterSurface, RecordingSurface,
    Surface, SurfaceSize, Transform,
};
