//! Per-frame activity signals: luminance, edges and skin tone.

use image::{GrayImage, Luma, RgbImage};
use imageproc::edges::canny;

/// Canny hysteresis thresholds.
pub const EDGE_LOW_THRESHOLD: f32 = 50.0;
pub const EDGE_HIGH_THRESHOLD: f32 = 150.0;

/// Skin tone range in 8-bit HSV (hue in half-degrees, 0-180).
pub const SKIN_HUE_MAX: f64 = 20.0;
pub const SKIN_SATURATION_MIN: f64 = 20.0;
pub const SKIN_VALUE_MIN: f64 = 70.0;

/// Value contributed by a pixel that is set in a binary mask.
pub const MASK_ON: f32 = 255.0;

/// ITU-R BT.601 luminance with integer rounding.
#[inline]
pub fn luminance(r: u8, g: u8, b: u8) -> u8 {
    ((299 * r as u32 + 587 * g as u32 + 114 * b as u32 + 500) / 1000) as u8
}

/// Convert a colour frame to single-channel luminance.
pub fn to_luma(frame: &RgbImage) -> GrayImage {
    let mut gray = GrayImage::new(frame.width(), frame.height());
    for (dst, src) in gray.pixels_mut().zip(frame.pixels()) {
        let [r, g, b] = src.0;
        *dst = Luma([luminance(r, g, b)]);
    }
    gray
}

/// Binary edge response of a luminance frame (255 on edges, 0 elsewhere).
pub fn edge_map(gray: &GrayImage) -> GrayImage {
    canny(gray, EDGE_LOW_THRESHOLD, EDGE_HIGH_THRESHOLD)
}

/// Convert RGB (0-255) to HSV with hue in degrees and S, V in 0-1.
fn rgb_to_hsv(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let r = r / 255.0;
    let g = g / 255.0;
    let b = b / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let v = max;
    let s = if max == 0.0 { 0.0 } else { delta / max };

    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (((g - b) / delta) % 6.0)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };

    let h = if h < 0.0 { h + 360.0 } else { h };

    (h, s, v)
}

/// Whether a pixel falls inside the skin tone range.
#[inline]
pub fn is_skin(r: u8, g: u8, b: u8) -> bool {
    let (h, s, v) = rgb_to_hsv(r as f64, g as f64, b as f64);
    let hue = (h / 2.0).round();
    let saturation = (s * 255.0).round();
    let value = (v * 255.0).round();

    hue <= SKIN_HUE_MAX && saturation >= SKIN_SATURATION_MIN && value >= SKIN_VALUE_MIN
}
