//! Image acquisition.
//!
//! Turns a local file into a [`DisplayedImage`](crate::frame::DisplayedImage)
//! the overlay can be drawn over. Sources are local only: there is no network
//! fetch, remote URLs are recognised solely to report them clearly.

pub mod file;
pub mod remote;

pub use file::{is_local_file_path, load_image};
pub use remote::looks_like_image_url;
