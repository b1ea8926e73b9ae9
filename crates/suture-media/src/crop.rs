//! Cropping still images to a detected region.

use image::{GenericImageView, ImageFormat};
use std::path::{Path, PathBuf};
use suture_models::CropRegion;
use tracing::{debug, info, warn};

use crate::activity::detect_active_region_with;
use crate::config::SmartCropConfig;
use crate::error::{MediaError, MediaResult};
use crate::metrics as media_metrics;

/// Path of the cropped copy: `<dir>/<stem><suffix>.png`.
pub fn cropped_path_for(image_path: &Path, suffix: &str) -> PathBuf {
    let stem = image_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "image".to_string());

    image_path.with_file_name(format!("{}{}.png", stem, suffix))
}

/// Crop `image_path` to `region` and write a PNG to `output_path`.
///
/// The region is clipped to the image, which may differ in size from the
/// video frames it was detected on. Returns the region actually cropped,
/// or `None` when it does not overlap the image.
pub fn crop_image_file(
    image_path: &Path,
    region: &CropRegion,
    output_path: &Path,
) -> MediaResult<Option<CropRegion>> {
    if !image_path.exists() {
        return Err(MediaError::FileNotFound(image_path.to_path_buf()));
    }

    let image = image::open(image_path).map_err(|e| MediaError::ImageDecode(e.to_string()))?;

    let Some(clipped) = region.clip_to(image.width(), image.height()) else {
        debug!(
            "Crop region {} lies outside {}x{} image",
            region,
            image.width(),
            image.height()
        );
        return Ok(None);
    };

    if clipped != *region {
        debug!("Crop region {} clipped to {}", region, clipped);
    }

    let cropped = image.crop_imm(clipped.x, clipped.y, clipped.width, clipped.height);
    cropped
        .save_with_format(output_path, ImageFormat::Png)
        .map_err(|e| MediaError::ImageEncode(e.to_string()))?;

    Ok(Some(clipped))
}

/// Write a cropped copy next to the image using the default suffix.
///
/// Returns the new path, or `None` if no artifact was produced. The
/// original image is never modified.
pub async fn apply_crop(image_path: impl AsRef<Path>, region: CropRegion) -> Option<PathBuf> {
    apply_crop_with(image_path, region, &SmartCropConfig::default()).await
}

/// [`apply_crop`] with an explicit configuration.
pub async fn apply_crop_with(
    image_path: impl AsRef<Path>,
    region: CropRegion,
    config: &SmartCropConfig,
) -> Option<PathBuf> {
    let image_path = image_path.as_ref().to_path_buf();
    let output_path = cropped_path_for(&image_path, &config.cropped_suffix);

    let task_image = image_path.clone();
    let task_output = output_path.clone();
    let result =
        tokio::task::spawn_blocking(move || crop_image_file(&task_image, &region, &task_output))
            .await
            .map_err(|e| MediaError::internal(format!("crop task failed: {}", e)))
            .and_then(|r| r);

    match result {
        Ok(Some(applied)) => {
            info!(
                "Smart crop applied: {} -> {}",
                applied,
                output_path.display()
            );
            media_metrics::record_crop_written();
            Some(output_path)
        }
        Ok(None) => {
            warn!(
                "Crop region {} does not overlap {}, using full image",
                region,
                image_path.display()
            );
            None
        }
        Err(e) => {
            warn!("Could not crop {}: {}", image_path.display(), e);
            None
        }
    }
}

/// Crop a still image to the active region of a video.
///
/// `None` means "use the original image": the video could not be
/// analyzed, the detection was not confident, or the crop failed.
pub async fn smart_crop_image(
    image_path: impl AsRef<Path>,
    video_path: impl AsRef<Path>,
    config: &SmartCropConfig,
) -> Option<PathBuf> {
    let Some(region) = detect_active_region_with(video_path, config, None).await else {
        info!("No active area detected, using full image");
        return None;
    };

    apply_crop_with(image_path, region, config).await
}
