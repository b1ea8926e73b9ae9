//! Weighted fusion of the activity signals.

use ndarray::{s, Array2};
use suture_models::CropRegion;

use super::sampler::ActivityMap;

/// Weight of the motion signal.
pub const MOTION_WEIGHT: f32 = 0.4;
/// Weight of the edge signal.
pub const EDGE_WEIGHT: f32 = 0.4;
/// Weight of the skin signal. Skin tone is the noisiest cue.
pub const SKIN_WEIGHT: f32 = 0.2;

/// Single scalar activity map, indexed `[row, col]`.
#[derive(Debug, Clone, PartialEq)]
pub struct FusedMap {
    values: Array2<f32>,
}

impl FusedMap {
    /// `0.4 * motion + 0.4 * edge + 0.2 * skin`, elementwise.
    pub fn fuse(map: &ActivityMap) -> Self {
        let values = &map.motion * MOTION_WEIGHT + &map.edge * EDGE_WEIGHT + &map.skin * SKIN_WEIGHT;
        Self { values }
    }

    /// Wrap an existing map.
    pub fn from_array(values: Array2<f32>) -> Self {
        Self { values }
    }

    /// A map of zeros.
    pub fn zeros(width: u32, height: u32) -> Self {
        Self::from_array(Array2::zeros((height as usize, width as usize)))
    }

    pub fn values(&self) -> &Array2<f32> {
        &self.values
    }

    pub fn width(&self) -> u32 {
        self.values.ncols() as u32
    }

    pub fn height(&self) -> u32 {
        self.values.nrows() as u32
    }

    /// Mean over the whole map, 0 for an empty map.
    pub fn mean(&self) -> f64 {
        mean_of(self.values.iter())
    }

    /// Mean inside `region`, clipped to the map. 0 when nothing overlaps.
    pub fn region_mean(&self, region: &CropRegion) -> f64 {
        let Some(clipped) = region.clip_to(self.width(), self.height()) else {
            return 0.0;
        };

        let x = clipped.x as usize;
        let y = clipped.y as usize;
        let window = self.values.slice(s![
            y..y + clipped.height as usize,
            x..x + clipped.width as usize
        ]);
        mean_of(window.iter())
    }
}

/// Mean accumulated in f64 so large frames do not lose precision.
fn mean_of<'a>(values: impl Iterator<Item = &'a f32>) -> f64 {
    let (sum, count) = values.fold((0.0f64, 0usize), |(sum, count), &v| (sum + v as f64, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
