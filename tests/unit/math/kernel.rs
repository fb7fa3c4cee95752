//! Tests for Gaussian kernel construction

#[cfg(test)]
mod tests {
    use patchgrow::math::kernel::{gaussian_kernel_2d, window_sigma};

    // Tests kernel normalization
    // Verified by removing the division by the kernel total
    #[test]
    fn test_gaussian_kernel_sums_to_one() {
        for size in [3, 5, 11, 15] {
            let kernel = gaussian_kernel_2d(size, window_sigma(size));
            assert!(
                (kernel.sum() - 1.0).abs() < 1e-12,
                "Kernel of size {size} sums to {}",
                kernel.sum()
            );
        }
    }

    // Tests the kernel peaks at the center and is symmetric
    // Verified by offsetting the center by one cell
    #[test]
    fn test_gaussian_kernel_center_peak_and_symmetry() {
        let kernel = gaussian_kernel_2d(5, 1.0);
        let center = kernel[[2, 2]];

        for ((r, c), &value) in kernel.indexed_iter() {
            assert!(value <= center, "Cell ({r}, {c}) exceeds the center");
            assert!((value - kernel[[4 - r, c]]).abs() < 1e-15);
            assert!((value - kernel[[r, 4 - c]]).abs() < 1e-15);
            assert!((value - kernel[[c, r]]).abs() < 1e-15);
        }
        assert!(kernel[[0, 0]] < kernel[[0, 2]]);
    }

    // Tests non-positive sigma collapses to a unit impulse
    // Verified by letting sigma of zero divide through
    #[test]
    fn test_gaussian_kernel_zero_sigma_is_impulse() {
        let kernel = gaussian_kernel_2d(3, 0.0);
        assert!((kernel[[1, 1]] - 1.0).abs() < f64::EPSILON);
        assert!((kernel.sum() - 1.0).abs() < f64::EPSILON);
    }

    // Tests the classic window / 6.4 standard deviation
    // Verified by changing the divisor
    #[test]
    fn test_window_sigma_matches_classic_parameterization() {
        assert!((window_sigma(11) - 11.0 / 6.4).abs() < 1e-12);
        assert!((window_sigma(32) - 5.0).abs() < 1e-12);
    }
}
