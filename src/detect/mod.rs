mod backend;
mod backends;
mod filter;
mod result;

pub use backend::DetectorBackend;
pub use backends::{JsonFileBackend, StubBackend};
pub use filter::{DetectionFilter, DEFAULT_MAX_DETECTIONS, DEFAULT_MIN_SCORE};
pub use result::Detection;
