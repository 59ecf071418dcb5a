use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};

use crate::detect::backend::DetectorBackend;
use crate::detect::result::Detection;

/// Replays detections saved from a previous model run.
///
/// The file holds a JSON array in the coco-ssd result shape. It is read on
/// `warm_up` (or lazily on the first `detect`) and reused afterwards.
pub struct JsonFileBackend {
    path: PathBuf,
    cached: Option<Vec<Detection>>,
}

impl JsonFileBackend {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            cached: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&mut self) -> Result<&[Detection]> {
        if self.cached.is_none() {
            let raw = std::fs::read_to_string(&self.path).map_err(|e| {
                anyhow!(
                    "failed to read detections file {}: {}",
                    self.path.display(),
                    e
                )
            })?;
            let parsed: Vec<Detection> = serde_json::from_str(&raw).map_err(|e| {
                anyhow!("invalid detections file {}: {}", self.path.display(), e)
            })?;
            log::info!(
                "JsonFileBackend: loaded {} detections from {}",
                parsed.len(),
                self.path.display()
            );
            self.cached = Some(parsed);
        }
        Ok(self.cached.as_deref().unwrap_or_default())
    }
}

impl DetectorBackend for JsonFileBackend {
    fn name(&self) -> &'static str {
        "json"
    }

    fn detect(&mut self, _pixels: &[u8], width: u32, height: u32) -> Result<Vec<Detection>> {
        let detections = self.load()?.to_vec();
        log::debug!(
            "JsonFileBackend: {} detections for {}x{} frame",
            detections.len(),
            width,
            height
        );
        Ok(detections)
    }

    fn warm_up(&mut self) -> Result<()> {
        self.load().map(|_| ())
    }
}
