//! Crop acceptance by relative activity density.

use suture_models::CropRegion;

use super::fusion::FusedMap;
use crate::config::DEFAULT_CONFIDENCE_THRESHOLD;

/// Accepts or rejects a crop window by its confidence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceGate {
    threshold: f64,
}

impl Default for ConfidenceGate {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIDENCE_THRESHOLD)
    }
}

impl ConfidenceGate {
    /// Create a gate; the threshold is clamped to [0, 1].
    pub fn new(threshold: f64) -> Self {
        let threshold = if threshold.is_nan() {
            DEFAULT_CONFIDENCE_THRESHOLD
        } else {
            threshold.clamp(0.0, 1.0)
        };
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Mean activity inside `region` over the frame mean, capped at 1.
    ///
    /// 0 when the frame has no activity or the region has no area.
    pub fn confidence(&self, fused: &FusedMap, region: &CropRegion) -> f64 {
        let frame_mean = fused.mean();
        if frame_mean <= 0.0 || region.is_empty() {
            return 0.0;
        }

        (fused.region_mean(region) / frame_mean).clamp(0.0, 1.0)
    }

    /// Whether `confidence` clears the threshold.
    pub fn accepts(&self, confidence: f64) -> bool {
        confidence >= self.threshold
    }
}
