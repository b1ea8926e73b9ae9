//! Video activity analysis and smart cropping.
//!
//! This crate provides:
//! - ffprobe probing and an FFmpeg raw-frame reader
//! - Motion, edge and skin-tone activity sampling over the end of a video
//! - Portrait crop placement on the activity peak, gated by confidence
//! - Fail-soft cropping of still images to the detected region

pub mod activity;
pub mod config;
pub mod crop;
pub mod error;
pub mod frames;
pub mod logging;
pub mod metrics;
pub mod probe;

pub use activity::{
    analyze_activity, detect_active_region, detect_active_region_with, ActivityAnalysis,
    ActivityMap, ConfidenceGate, FrameActivitySampler, FusedMap,
};
pub use config::SmartCropConfig;
pub use crop::{apply_crop, apply_crop_with, crop_image_file, cropped_path_for, smart_crop_image};
pub use error::{MediaError, MediaResult};
pub use frames::{FrameReader, FrameSource, RawFrameCommand};
pub use logging::init_tracing;
pub use probe::{probe_video, VideoInfo};

pub use suture_models::{AspectRatio, CropRegion};
