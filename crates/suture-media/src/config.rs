//! Smart crop configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default minimum confidence for accepting a crop.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.7;

/// Default trailing analysis window in seconds.
pub const DEFAULT_ANALYSIS_WINDOW_SECS: f64 = 15.0;

/// Default wall-clock limit for one analysis run.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default suffix appended to cropped image names.
pub const DEFAULT_CROPPED_SUFFIX: &str = "_cropped";

/// Smart crop configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmartCropConfig {
    /// Minimum confidence (0.0-1.0) for a crop to be applied
    pub confidence_threshold: f64,
    /// Seconds from the end of the video to analyze
    pub analysis_window_secs: f64,
    /// Analysis timeout in seconds (0 disables the timeout)
    pub timeout_secs: u64,
    /// Suffix appended to the image stem for the cropped copy
    pub cropped_suffix: String,
}

impl Default for SmartCropConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            analysis_window_secs: DEFAULT_ANALYSIS_WINDOW_SECS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            cropped_suffix: DEFAULT_CROPPED_SUFFIX.to_string(),
        }
    }
}

impl SmartCropConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            confidence_threshold: std::env::var("SMART_CROP_CONFIDENCE_THRESHOLD")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_CONFIDENCE_THRESHOLD),
            analysis_window_secs: std::env::var("SMART_CROP_WINDOW_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_ANALYSIS_WINDOW_SECS),
            timeout_secs: std::env::var("SMART_CROP_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            cropped_suffix: std::env::var("SMART_CROP_SUFFIX")
                .unwrap_or_else(|_| DEFAULT_CROPPED_SUFFIX.to_string()),
        }
        .validated()
    }

    /// Set the confidence threshold.
    pub fn with_confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self.validated()
    }

    /// Set the analysis window.
    pub fn with_analysis_window(mut self, secs: f64) -> Self {
        self.analysis_window_secs = secs;
        self.validated()
    }

    /// Set the timeout (0 disables it).
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Clamp the threshold to [0, 1] and reset a non-positive window.
    pub fn validated(mut self) -> Self {
        self.confidence_threshold = if self.confidence_threshold.is_nan() {
            DEFAULT_CONFIDENCE_THRESHOLD
        } else {
            self.confidence_threshold.clamp(0.0, 1.0)
        };

        if !(self.analysis_window_secs.is_finite() && self.analysis_window_secs > 0.0) {
            self.analysis_window_secs = DEFAULT_ANALYSIS_WINDOW_SECS;
        }

        if self.cropped_suffix.is_empty() {
            self.cropped_suffix = DEFAULT_CROPPED_SUFFIX.to_string();
        }

        self
    }

    /// Analysis timeout, `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}
