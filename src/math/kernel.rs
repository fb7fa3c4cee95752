//! Gaussian spatial kernels for neighborhood weighting

use ndarray::Array2;

/// Build a square Gaussian kernel normalized to sum to one
///
/// Entries are `exp(-(dr² + dc²) / 2σ²)` measured from the center cell, so
/// `size` is expected to be odd. A non-positive `sigma` degenerates to a unit
/// impulse at the center.
pub fn gaussian_kernel_2d(size: usize, sigma: f64) -> Array2<f64> {
    let center = size / 2;

    if sigma <= 0.0 {
        return Array2::from_shape_fn((size, size), |(r, c)| {
            if r == center && c == center { 1.0 } else { 0.0 }
        });
    }

    let half = center as f64;
    let two_sigma_sq = 2.0 * sigma * sigma;
    let mut kernel = Array2::from_shape_fn((size, size), |(r, c)| {
        let dr = r as f64 - half;
        let dc = c as f64 - half;
        (-dr.mul_add(dr, dc * dc) / two_sigma_sq).exp()
    });

    let total = kernel.sum();
    if total > 0.0 {
        kernel /= total;
    }
    kernel
}

/// Standard deviation for a window of the given size
///
/// Matches the classic Efros-Leung choice of `window / 6.4`.
pub fn window_sigma(window_size: usize) -> f64 {
    window_size as f64 / crate::io::configuration::GAUSSIAN_SIGMA_DIVISOR
}
