//! Crop window placement around the activity peak.
//!
//! The fused map is smoothed, the global maximum located, and a fixed 9:16
//! window centered on it. Windows that would leave the frame are shifted
//! inward; they are never shrunk.

use ndarray::Array2;
use suture_models::{AspectRatio, CropRegion};
use tracing::debug;

use super::fusion::FusedMap;
use super::smoothing::gaussian_blur;

/// A selected crop window and the peak it was centered on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionSelection {
    pub region: CropRegion,
    /// Column and row of the smoothed maximum
    pub peak: (u32, u32),
    /// Smoothed activity at the peak
    pub peak_value: f32,
}

/// Position of the global maximum as `(col, row)`.
///
/// Ties go to the first maximum in row-major order. An empty map yields
/// `(0, 0)`.
pub fn find_peak(map: &Array2<f32>) -> ((u32, u32), f32) {
    let mut best = ((0u32, 0u32), f32::NEG_INFINITY);

    for ((row, col), &value) in map.indexed_iter() {
        if value > best.1 {
            best = ((col as u32, row as u32), value);
        }
    }

    if best.1 == f32::NEG_INFINITY {
        ((0, 0), 0.0)
    } else {
        best
    }
}

/// Place a `width` x `height` window centered on `peak`, shifted inside
/// a `frame_width` x `frame_height` frame.
pub fn place_window(
    peak: (u32, u32),
    width: u32,
    height: u32,
    frame_width: u32,
    frame_height: u32,
) -> CropRegion {
    let width = width.min(frame_width);
    let height = height.min(frame_height);

    let x = peak.0.saturating_sub(width / 2).min(frame_width - width);
    let y = peak.1.saturating_sub(height / 2).min(frame_height - height);

    CropRegion::new(x, y, width, height)
}

/// Select the portrait crop window for a fused activity map.
///
/// Always returns a window inside the frame, even for an all-zero map;
/// judging it is left to the confidence gate.
pub fn select_region(fused: &FusedMap) -> RegionSelection {
    let (frame_width, frame_height) = (fused.width(), fused.height());

    let smoothed = gaussian_blur(fused.values());
    let (peak, peak_value) = find_peak(&smoothed);

    let (width, height) = AspectRatio::PORTRAIT.window_within(frame_width, frame_height);
    let region = place_window(peak, width, height, frame_width, frame_height);

    debug!(
        "Activity peak at ({}, {}) = {:.3}, crop window {}",
        peak.0, peak.1, peak_value, region
    );

    RegionSelection {
        region,
        peak,
        peak_value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peak_tie_break_is_row_major_first() {
        let mut map = Array2::zeros((4, 6));
        map[[2, 1]] = 5.0f32;
        map[[1, 4]] = 5.0;
        map[[3, 0]] = 5.0;
        assert_eq!(find_peak(&map), ((4, 1), 5.0));
    }

    #[test]
    fn test_peak_of_flat_map_is_origin() {
        let map = Array2::from_elem((3, 3), 2.0f32);
        assert_eq!(find_peak(&map), ((0, 0), 2.0));
        assert_eq!(find_peak(&Array2::zeros((0, 0))), ((0, 0), 0.0));
    }

    #[test]
    fn test_window_centered_when_room() {
        let region = place_window((960, 540), 607, 1080, 1920, 1080);
        assert_eq!(region, CropRegion::new(657, 0, 607, 1080));
    }

    #[test]
    fn test_window_shifted_inward() {
        let left = place_window((10, 500), 607, 1080, 1920, 1080);
        assert_eq!(left.x, 0);

        let right = place_window((1915, 500), 607, 1080, 1920, 1080);
        assert_eq!(right.x, 1920 - 607);
        assert_eq!(right.width, 607);

        let bottom = place_window((500, 1900), 1080, 1920, 1080, 1920);
        assert_eq!((bottom.x, bottom.y), (0, 0));
    }

    #[test]
    fn test_select_region_follows_activity() {
        let mut values = Array2::zeros((360, 640));
        for row in 150..170 {
            for col in 500..520 {
                values[[row, col]] = 200.0f32;
            }
        }

        let selection = select_region(&FusedMap::from_array(values));
        // 9:16 window inside 640x360 is 202x360
        assert_eq!((selection.region.width, selection.region.height), (202, 360));
        assert!(selection.region.fits_within(640, 360));
        assert!(selection.region.x <= 509 && 509 < selection.region.x + 202);
        assert!(selection.peak.0 >= 500 && selection.peak.0 < 520);
    }

    #[test]
    fn test_select_region_all_zero_is_still_valid() {
        let selection = select_region(&FusedMap::zeros(1920, 1080));
        assert_eq!(selection.peak, (0, 0));
        assert_eq!(selection.region, CropRegion::new(0, 0, 607, 1080));
    }
}
