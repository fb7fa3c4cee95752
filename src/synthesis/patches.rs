//! Candidate patch table and spatial kernel precomputed from the sample
//!
//! Every window placement in the sample becomes one channel-stacked row of the
//! candidate table: all channel-0 values of the window in row-major order, then
//! all channel-1 values, and so on. The Gaussian kernel is stored in the same
//! layout so that distances reduce to plain elementwise arithmetic.

use ndarray::{Array1, Array2, ArrayView1, ArrayView3, s};

use crate::io::configuration::MIN_WINDOW_SIZE;
use crate::io::error::{Result, ensure_min_dimensions, invalid_parameter, invariant_violation};
use crate::math::kernel::{gaussian_kernel_2d, window_sigma};

/// Round an even window size up to the next odd size
///
/// Larger windows are favored over smaller ones since they capture more
/// structure from the sample.
pub const fn effective_window_size(window_size: usize) -> usize {
    if window_size % 2 == 0 {
        window_size + 1
    } else {
        window_size
    }
}

/// Flatten a `(rows, cols, channels)` window into a channel-stacked vector
pub fn channel_stacked(window: ArrayView3<'_, f64>) -> Array1<f64> {
    window.permuted_axes([2, 0, 1]).iter().copied().collect()
}

/// Read-only table of every sliding-window patch in the sample
#[derive(Debug, Clone)]
pub struct PatchIndex {
    window_size: usize,
    channels: usize,
    /// One channel-stacked row per window placement
    candidates: Array2<f64>,
    /// Sample coordinates of each placement's center pixel
    centers: Vec<[usize; 2]>,
    /// Channel-stacked Gaussian kernel, each channel block summing to one
    kernel: Array1<f64>,
}

impl PatchIndex {
    /// Build the candidate table and kernel for a sample
    ///
    /// Even window sizes are incremented before anything else happens.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The adjusted window is smaller than [`MIN_WINDOW_SIZE`]
    /// - The sample has no channels
    /// - The window does not fit inside the sample
    pub fn build(sample: ArrayView3<'_, f64>, window_size: usize) -> Result<Self> {
        let window_size = effective_window_size(window_size);
        if window_size < MIN_WINDOW_SIZE {
            return Err(invalid_parameter(
                "window_size",
                &window_size,
                &format!("window must be at least {MIN_WINDOW_SIZE} pixels wide"),
            ));
        }

        let (rows, cols, channels) = sample.dim();
        if channels == 0 {
            return Err(invalid_parameter(
                "sample",
                &"0 channels",
                &"sample must have at least one channel",
            ));
        }
        ensure_min_dimensions("sample (for window)", rows, cols, window_size)?;

        let placements_rows = rows - window_size + 1;
        let placements_cols = cols - window_size + 1;
        let patch_len = window_size * window_size * channels;
        let half = window_size / 2;

        let mut flat = Vec::with_capacity(placements_rows * placements_cols * patch_len);
        let mut centers = Vec::with_capacity(placements_rows * placements_cols);

        for i in 0..placements_rows {
            for j in 0..placements_cols {
                let window = sample.slice(s![i..i + window_size, j..j + window_size, ..]);
                flat.extend(channel_stacked(window));
                centers.push([i + half, j + half]);
            }
        }

        let candidates = Array2::from_shape_vec((centers.len(), patch_len), flat)
            .map_err(|e| invariant_violation("PatchIndex::build", &e))?;

        let spatial = gaussian_kernel_2d(window_size, window_sigma(window_size));
        let kernel: Array1<f64> = (0..channels)
            .flat_map(|_| spatial.iter().copied())
            .collect();

        tracing::debug!(
            "Indexed {} candidate patches of {window_size}x{window_size}x{channels}",
            centers.len()
        );

        Ok(Self {
            window_size,
            channels,
            candidates,
            centers,
            kernel,
        })
    }

    /// Odd window side length actually in use
    pub const fn window_size(&self) -> usize {
        self.window_size
    }

    /// Half the window size, which is also the padding width
    pub const fn half_window(&self) -> usize {
        self.window_size / 2
    }

    /// Number of channels per pixel
    pub const fn channels(&self) -> usize {
        self.channels
    }

    /// Length of a channel-stacked window vector
    pub const fn patch_len(&self) -> usize {
        self.window_size * self.window_size * self.channels
    }

    /// Number of window placements in the sample
    pub fn len(&self) -> usize {
        self.centers.len()
    }

    /// Whether the table holds no placements
    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }

    /// Candidate table, one channel-stacked row per placement
    pub const fn candidates(&self) -> &Array2<f64> {
        &self.candidates
    }

    /// Channel-stacked row of a single placement
    pub fn candidate(&self, index: usize) -> Option<ArrayView1<'_, f64>> {
        (index < self.len()).then(|| self.candidates.row(index))
    }

    /// Sample coordinates of the center pixel for a placement
    pub fn center(&self, index: usize) -> Option<[usize; 2]> {
        self.centers.get(index).copied()
    }

    /// Channel-stacked Gaussian kernel
    pub const fn kernel(&self) -> &Array1<f64> {
        &self.kernel
    }
}
