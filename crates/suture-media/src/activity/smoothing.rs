//! Separable Gaussian smoothing of activity maps.

use ndarray::Array2;

/// Side length of the smoothing kernel.
pub const KERNEL_SIZE: usize = 21;

/// Sigma derived from a kernel size, `0.3 * ((k - 1) / 2 - 1) + 0.8`.
pub fn sigma_for_kernel(size: usize) -> f64 {
    0.3 * ((size as f64 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Normalized 1-D Gaussian weights.
pub fn gaussian_kernel(size: usize, sigma: f64) -> Vec<f64> {
    let center = (size as f64 - 1.0) / 2.0;
    let weights: Vec<f64> = (0..size)
        .map(|i| {
            let d = i as f64 - center;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let total: f64 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}

/// Mirror an out-of-range index without repeating the edge sample
/// (`dcb|abcd|cba`).
fn reflect_101(index: isize, len: usize) -> usize {
    if len <= 1 {
        return 0;
    }
    let period = 2 * (len as isize - 1);
    let i = index.rem_euclid(period);
    let len = len as isize;
    (if i >= len { period - i } else { i }) as usize
}

/// Smooth with the fixed 21x21 Gaussian.
pub fn gaussian_blur(map: &Array2<f32>) -> Array2<f32> {
    gaussian_blur_with(map, KERNEL_SIZE)
}

/// Smooth with a `size` x `size` Gaussian, one axis at a time.
pub fn gaussian_blur_with(map: &Array2<f32>, size: usize) -> Array2<f32> {
    let (rows, cols) = map.dim();
    if rows == 0 || cols == 0 || size <= 1 {
        return map.clone();
    }

    let kernel = gaussian_kernel(size, sigma_for_kernel(size));
    let radius = (size / 2) as isize;

    let mut horizontal = Array2::<f32>::zeros((rows, cols));
    for r in 0..rows {
        for c in 0..cols {
            let mut acc = 0.0f64;
            for (k, w) in kernel.iter().enumerate() {
                let src = reflect_101(c as isize + k as isize - radius, cols);
                acc += w * map[[r, src]] as f64;
            }
            horizontal[[r, c]] = acc as f32;
        }
    }

    let mut out = Array2::<f32>::zeros((rows, cols));
    for r in 0..rows {
        for c in 0..cols {
            let mut acc = 0.0f64;
            for (k, w) in kernel.iter().enumerate() {
                let src = reflect_101(r as isize + k as isize - radius, rows);
                acc += w * horizontal[[src, c]] as f64;
            }
            out[[r, c]] = acc as f32;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sigma() {
        assert!((sigma_for_kernel(21) - 3.5).abs() < 1e-12);
    }

    #[test]
    fn test_kernel_normalized_and_symmetric() {
        let kernel = gaussian_kernel(KERNEL_SIZE, 3.5);
        assert_eq!(kernel.len(), 21);
        assert!((kernel.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        for i in 0..10 {
            assert!((kernel[i] - kernel[20 - i]).abs() < 1e-15);
            assert!(kernel[i] < kernel[i + 1]);
        }
    }

    #[test]
    fn test_reflect_101() {
        assert_eq!(reflect_101(-1, 5), 1);
        assert_eq!(reflect_101(-2, 5), 2);
        assert_eq!(reflect_101(5, 5), 3);
        assert_eq!(reflect_101(6, 5), 2);
        assert_eq!(reflect_101(2, 5), 2);
        // Radius larger than the axis
        assert!(reflect_101(-13, 3) < 3);
        assert_eq!(reflect_101(7, 1), 0);
    }

    #[test]
    fn test_constant_map_unchanged() {
        let map = Array2::from_elem((30, 40), 7.0f32);
        let blurred = gaussian_blur(&map);
        assert!(blurred.iter().all(|&v| (v - 7.0).abs() < 1e-4));
    }

    #[test]
    fn test_impulse_spreads_but_peaks_in_place() {
        let mut map = Array2::zeros((41, 41));
        map[[20, 12]] = 100.0f32;
        let blurred = gaussian_blur(&map);

        let peak = blurred[[20, 12]];
        assert!(peak < 100.0 && peak > 0.0);
        assert!(blurred.iter().all(|&v| v <= peak));
        assert!(blurred[[20, 13]] > 0.0);
        // Mass is preserved away from the borders
        assert!((blurred.sum() - 100.0).abs() < 1e-2);
    }

    #[test]
    fn test_tiny_maps() {
        let map = Array2::from_elem((1, 1), 3.0f32);
        assert!((gaussian_blur(&map)[[0, 0]] - 3.0).abs() < 1e-5);

        let empty = Array2::<f32>::zeros((0, 5));
        assert_eq!(gaussian_blur(&empty).dim(), (0, 5));
    }
}
