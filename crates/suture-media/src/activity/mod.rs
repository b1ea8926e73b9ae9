//! Video activity analysis.
//!
//! Locates where manual work is concentrated in the last seconds of a
//! video and proposes a portrait crop around it:
//!
//! 1. [`FrameActivitySampler`] decodes the trailing window and averages
//!    motion, edge and skin-tone signals per pixel.
//! 2. [`FusedMap::fuse`] weights them into one activity map.
//! 3. [`select_region`] smooths the map and centers a 9:16 window on the
//!    activity peak.
//! 4. [`ConfidenceGate`] compares in-window and whole-frame activity and
//!    accepts or rejects the window.
//!
//! [`detect_active_region`] runs the whole pipeline and never fails: any
//! error or a low confidence comes back as `None`, meaning "use the
//! original image".

mod confidence;
mod fusion;
mod region;
mod sampler;
mod signals;
mod smoothing;

pub use confidence::ConfidenceGate;
pub use fusion::{FusedMap, EDGE_WEIGHT, MOTION_WEIGHT, SKIN_WEIGHT};
pub use region::{find_peak, place_window, select_region, RegionSelection};
pub use sampler::{ActivityAccumulator, ActivityMap, FrameActivitySampler, SamplingPlan};
pub use signals::{edge_map, is_skin, luminance, to_luma};
pub use smoothing::{gaussian_blur, KERNEL_SIZE};

use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use suture_models::CropRegion;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::config::SmartCropConfig;
use crate::error::{MediaError, MediaResult};
use crate::metrics::{self as media_metrics, outcome};

/// Result of analyzing one activity map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ActivityAnalysis {
    /// Proposed crop window
    pub region: CropRegion,
    /// In-window to whole-frame activity ratio (0-1)
    pub confidence: f64,
    /// Whether the confidence cleared the threshold
    pub accepted: bool,
    /// Smoothed activity peak (column, row)
    pub peak: (u32, u32),
    /// Frames that contributed to the map
    pub frames_read: u64,
    pub frame_width: u32,
    pub frame_height: u32,
}

impl ActivityAnalysis {
    /// Select and gate a region for an already fused map.
    pub fn from_fused(fused: &FusedMap, gate: &ConfidenceGate, frames_read: u64) -> Self {
        let selection = select_region(fused);
        // Judged against the unsmoothed map
        let confidence = gate.confidence(fused, &selection.region);
        // No activity or no window area never yields a crop, whatever the threshold
        let has_signal = fused.mean() > 0.0 && !selection.region.is_empty();

        Self {
            region: selection.region,
            confidence,
            accepted: has_signal && gate.accepts(confidence),
            peak: selection.peak,
            frames_read,
            frame_width: fused.width(),
            frame_height: fused.height(),
        }
    }

    /// The region if it was accepted.
    pub fn accepted_region(&self) -> Option<CropRegion> {
        self.accepted.then_some(self.region)
    }
}

/// Run the full analysis on a video.
///
/// Errors are returned for callers that want the diagnostic; see
/// [`detect_active_region`] for the fail-soft variant.
pub async fn analyze_activity(
    video_path: impl AsRef<Path>,
    config: &SmartCropConfig,
    cancel_rx: Option<watch::Receiver<bool>>,
) -> MediaResult<ActivityAnalysis> {
    let video_path = video_path.as_ref();
    let started = Instant::now();

    let mut sampler =
        FrameActivitySampler::new(config.analysis_window_secs).with_timeout(config.timeout());
    if let Some(rx) = cancel_rx {
        sampler = sampler.with_cancel(rx);
    }

    let map = match sampler.sample(video_path).await {
        Ok(map) => map,
        Err(e) => {
            media_metrics::record_analysis_failure(e.kind());
            return Err(e);
        }
    };

    let gate = ConfidenceGate::new(config.confidence_threshold);
    let frames_read = map.frames_read;

    // Smoothing a full-resolution map is CPU heavy
    let analysis = tokio::task::spawn_blocking(move || {
        let fused = FusedMap::fuse(&map);
        ActivityAnalysis::from_fused(&fused, &gate, frames_read)
    })
    .await
    .map_err(|e| MediaError::internal(format!("analysis task failed: {}", e)))?;

    media_metrics::record_analysis(
        started.elapsed().as_secs_f64(),
        analysis.frames_read,
        analysis.confidence,
    );

    Ok(analysis)
}

/// Detect the active work region of a video.
///
/// Returns `None` when the video cannot be analyzed or the confidence is
/// below the default threshold.
pub async fn detect_active_region(
    video_path: impl AsRef<Path>,
    window_secs: f64,
) -> Option<CropRegion> {
    let config = SmartCropConfig::default().with_analysis_window(window_secs);
    detect_active_region_with(video_path, &config, None).await
}

/// [`detect_active_region`] with explicit configuration and cancellation.
pub async fn detect_active_region_with(
    video_path: impl AsRef<Path>,
    config: &SmartCropConfig,
    cancel_rx: Option<watch::Receiver<bool>>,
) -> Option<CropRegion> {
    let video_path = video_path.as_ref();

    match analyze_activity(video_path, config, cancel_rx).await {
        Ok(analysis) if analysis.accepted => {
            info!(
                "Smart crop detected with confidence {:.2}: {}",
                analysis.confidence, analysis.region
            );
            media_metrics::record_crop_outcome(outcome::ACCEPTED);
            Some(analysis.region)
        }
        Ok(analysis) => {
            info!(
                "Smart crop confidence too low: {:.2} < {:.2}",
                analysis.confidence, config.confidence_threshold
            );
            media_metrics::record_crop_outcome(outcome::LOW_CONFIDENCE);
            None
        }
        Err(e) => {
            warn!(
                "Smart crop unavailable for {}: {}",
                video_path.display(),
                e
            );
            media_metrics::record_crop_outcome(outcome::UNAVAILABLE);
            None
        }
    }
}
