//! Metrics for video analysis and cropping.
//!
//! Only the `metrics` facade is used here; installing an exporter is up to
//! the host application.

use metrics::{counter, histogram};

/// Metric names as constants for consistency.
pub mod names {
    pub const SMART_CROP_OUTCOMES_TOTAL: &str = "suture_smart_crop_outcomes_total";
    pub const ANALYSIS_DURATION_SECONDS: &str = "suture_activity_analysis_duration_seconds";
    pub const ANALYSIS_FAILURES_TOTAL: &str = "suture_activity_analysis_failures_total";
    pub const FRAMES_SAMPLED_TOTAL: &str = "suture_frames_sampled_total";
    pub const CROP_CONFIDENCE: &str = "suture_crop_confidence";
    pub const CROPS_WRITTEN_TOTAL: &str = "suture_crops_written_total";
}

/// Smart crop outcome labels.
pub mod outcome {
    pub const ACCEPTED: &str = "accepted";
    pub const LOW_CONFIDENCE: &str = "low_confidence";
    pub const UNAVAILABLE: &str = "unavailable";
}

/// Record a finished activity analysis.
pub fn record_analysis(duration_secs: f64, frames_read: u64, confidence: f64) {
    histogram!(names::ANALYSIS_DURATION_SECONDS).record(duration_secs);
    counter!(names::FRAMES_SAMPLED_TOTAL).increment(frames_read);
    histogram!(names::CROP_CONFIDENCE).record(confidence);
}

/// Record a failed activity analysis.
pub fn record_analysis_failure(kind: &'static str) {
    counter!(names::ANALYSIS_FAILURES_TOTAL, "kind" => kind).increment(1);
}

/// Record the outcome of a region detection.
pub fn record_crop_outcome(outcome: &'static str) {
    counter!(names::SMART_CROP_OUTCOMES_TOTAL, "outcome" => outcome).increment(1);
}

/// Record a cropped image written to disk.
pub fn record_crop_written() {
    counter!(names::CROPS_WRITTEN_TOTAL).increment(1);
}
