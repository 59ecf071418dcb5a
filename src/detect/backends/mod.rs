pub mod json;
pub mod stub;

pub use json::JsonFileBackend;
pub use stub::StubBackend;
