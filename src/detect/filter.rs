use super::result::Detection;

/// Default cap on boxes kept from a single run.
pub const DEFAULT_MAX_DETECTIONS: usize = 20;
/// Default score floor.
pub const DEFAULT_MIN_SCORE: f64 = 0.5;

/// Post-detection cut: score floor plus a cap on the number of boxes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectionFilter {
    pub max_detections: usize,
    pub min_score: f64,
}

impl Default for DetectionFilter {
    fn default() -> Self {
        Self {
            max_detections: DEFAULT_MAX_DETECTIONS,
            min_score: DEFAULT_MIN_SCORE,
        }
    }
}

impl DetectionFilter {
    /// Keep detections scoring at least `min_score`. When more than
    /// `max_detections` survive, the highest scoring ones are kept in their
    /// original relative order.
    pub fn apply(&self, detections: Vec<Detection>) -> Vec<Detection> {
        let mut kept: Vec<(usize, Detection)> = detections
            .into_iter()
            .filter(|d| d.score >= self.min_score)
            .enumerate()
            .collect();

        if kept.len() > self.max_detections {
            kept.sort_by(|a, b| b.1.score.total_cmp(&a.1.score).then(a.0.cmp(&b.0)));
            kept.truncate(self.max_detections);
            kept.sort_by_key(|(idx, _)| *idx);
        }

        kept.into_iter().map(|(_, d)| d).collect()
    }
}
