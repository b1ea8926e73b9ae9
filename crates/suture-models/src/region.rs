//! Crop regions in pixel coordinates.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Aspect ratio expressed as integer width:height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AspectRatio {
    pub width: u32,
    pub height: u32,
}

impl AspectRatio {
    /// Portrait (9:16), the shape of every smart crop.
    pub const PORTRAIT: AspectRatio = AspectRatio {
        width: 9,
        height: 16,
    };

    /// Create a new aspect ratio.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns the aspect ratio as a decimal.
    pub fn as_f64(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Largest window of this ratio that fits a frame, as `(width, height)`.
    ///
    /// Each side is `min(frame side, other frame side scaled by the ratio)`
    /// with integer truncation, so the result is within one pixel of the
    /// exact ratio and never exceeds the frame.
    pub fn window_within(&self, frame_width: u32, frame_height: u32) -> (u32, u32) {
        if self.width == 0 || self.height == 0 {
            return (0, 0);
        }

        let (fw, fh) = (frame_width as u64, frame_height as u64);
        let (aw, ah) = (self.width as u64, self.height as u64);

        let width = fw.min(fh * aw / ah);
        let height = fh.min(fw * ah / aw);

        (width as u32, height as u32)
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self::PORTRAIT
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

/// Rectangular sub-window of a frame, `(x, y)` being the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRegion {
    /// Create a new crop region.
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge (exclusive).
    #[inline]
    pub fn right(&self) -> u64 {
        self.x as u64 + self.width as u64
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub fn bottom(&self) -> u64 {
        self.y as u64 + self.height as u64
    }

    /// Area in pixels.
    #[inline]
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// True when the region covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width divided by height, 0.0 for a zero-height region.
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            0.0
        } else {
            self.width as f64 / self.height as f64
        }
    }

    /// Check that the region lies entirely inside a `frame_width` x `frame_height` frame.
    pub fn fits_within(&self, frame_width: u32, frame_height: u32) -> bool {
        self.right() <= frame_width as u64 && self.bottom() <= frame_height as u64
    }

    /// Intersect with the bounds of a `frame_width` x `frame_height` frame.
    ///
    /// Returns `None` when nothing of the region overlaps the frame.
    pub fn clip_to(&self, frame_width: u32, frame_height: u32) -> Option<CropRegion> {
        let right = self.right().min(frame_width as u64);
        let bottom = self.bottom().min(frame_height as u64);

        if right <= self.x as u64 || bottom <= self.y as u64 {
            return None;
        }

        Some(CropRegion {
            x: self.x,
            y: self.y,
            width: (right - self.x as u64) as u32,
            height: (bottom - self.y as u64) as u32,
        })
    }
}

impl fmt::Display for CropRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{}+{}+{}",
            self.width, self.height, self.x, self.y
        )
    }
}
