//! Neighborhood extraction from border-padded output buffers
//!
//! The output and its filled mask are mirrored into copies padded by half a
//! window on every side (zero values, unfilled mask). Reading a window around
//! any output pixel is then a plain slice with no boundary branching.

use ndarray::{Array1, Array2, Array3, ArrayView1, s};

use crate::io::error::{Result, invariant_violation};
use crate::synthesis::patches::channel_stacked;

/// Window-sized query around one output pixel
#[derive(Debug, Clone, PartialEq)]
pub struct Neighborhood {
    /// Channel-stacked values; unfilled positions hold zero
    pub values: Array1<f64>,
    /// Per-position validity, `window × window`, shared across channels
    pub mask: Array2<bool>,
}

impl Neighborhood {
    /// Assemble a neighborhood from its parts
    ///
    /// # Errors
    ///
    /// Returns an error if the mask is not square or the value vector length
    /// is not a whole number of mask-sized channel blocks
    pub fn new(values: Array1<f64>, mask: Array2<bool>) -> Result<Self> {
        let (rows, cols) = mask.dim();
        let plane = rows * cols;
        if rows != cols || plane == 0 || values.len() % plane != 0 {
            return Err(invariant_violation(
                "Neighborhood::new",
                &format!(
                    "{} values do not stack over a {rows}x{cols} mask",
                    values.len()
                ),
            ));
        }
        Ok(Self { values, mask })
    }

    /// Window side length
    pub fn window_size(&self) -> usize {
        self.mask.nrows()
    }

    /// Number of channels stacked in the value vector
    pub fn channels(&self) -> usize {
        self.values.len() / self.mask.len().max(1)
    }

    /// Number of filled positions in the window
    pub fn known_count(&self) -> usize {
        self.mask.iter().filter(|&&known| known).count()
    }
}

/// Output image and filled mask together with their padded mirrors
#[derive(Debug, Clone)]
pub struct PaddedCanvas {
    output: Array3<f64>,
    filled: Array2<bool>,
    padded_output: Array3<f64>,
    padded_filled: Array2<bool>,
    window_size: usize,
}

impl PaddedCanvas {
    /// Wrap seeded buffers and build their padded mirrors
    ///
    /// # Errors
    ///
    /// Returns an error if the output and mask disagree on dimensions or the
    /// window size is even
    pub fn new(output: Array3<f64>, filled: Array2<bool>, window_size: usize) -> Result<Self> {
        let (rows, cols, channels) = output.dim();
        if filled.dim() != (rows, cols) {
            return Err(invariant_violation(
                "PaddedCanvas::new",
                &format!(
                    "mask is {:?} but output is {rows}x{cols}",
                    filled.dim()
                ),
            ));
        }
        if window_size % 2 == 0 {
            return Err(invariant_violation(
                "PaddedCanvas::new",
                &format!("window size {window_size} is not odd"),
            ));
        }

        let pad = window_size / 2;
        let mut canvas = Self {
            output,
            filled,
            padded_output: Array3::zeros((rows + 2 * pad, cols + 2 * pad, channels)),
            padded_filled: Array2::from_elem((rows + 2 * pad, cols + 2 * pad), false),
            window_size,
        };
        canvas.resync();
        Ok(canvas)
    }

    /// Canonical output buffer
    pub const fn output(&self) -> &Array3<f64> {
        &self.output
    }

    /// Canonical filled mask
    pub const fn filled(&self) -> &Array2<bool> {
        &self.filled
    }

    /// Padded output mirror
    pub const fn padded_output(&self) -> &Array3<f64> {
        &self.padded_output
    }

    /// Padded mask mirror
    pub const fn padded_filled(&self) -> &Array2<bool> {
        &self.padded_filled
    }

    /// Output `(rows, cols)`
    pub fn dims(&self) -> (usize, usize) {
        self.filled.dim()
    }

    /// Whether the given output pixel has been written
    pub fn is_filled(&self, position: [usize; 2]) -> bool {
        self.filled.get(position).copied().unwrap_or(false)
    }

    /// Consume the canvas, keeping only the canonical output
    pub fn into_output(self) -> Array3<f64> {
        self.output
    }

    /// Extract the window centered on an output pixel
    ///
    /// Positions outside the output read as unfilled zeros.
    ///
    /// # Errors
    ///
    /// Returns an error if the position lies outside the output
    pub fn neighborhood(&self, position: [usize; 2]) -> Result<Neighborhood> {
        let (rows, cols) = self.dims();
        if position[0] >= rows || position[1] >= cols {
            return Err(invariant_violation(
                "PaddedCanvas::neighborhood",
                &format!("pixel {position:?} outside {rows}x{cols} output"),
            ));
        }

        // Padded coordinates of the window's top-left corner equal the
        // output coordinates of its center
        let [r, c] = position;
        let w = self.window_size;
        let values = channel_stacked(self.padded_output.slice(s![r..r + w, c..c + w, ..]));
        let mask = self.padded_filled.slice(s![r..r + w, c..c + w]).to_owned();

        Ok(Neighborhood { values, mask })
    }

    /// Copy pixel values into the output and mark the pixel filled
    ///
    /// The padded mirrors are updated immediately so later neighborhood
    /// reads observe the write.
    ///
    /// # Errors
    ///
    /// Returns an error if the pixel is outside the output, was already
    /// filled, or the channel count does not match
    pub fn write_pixel(&mut self, position: [usize; 2], values: ArrayView1<'_, f64>) -> Result<()> {
        let (rows, cols) = self.dims();
        let channels = self.output.dim().2;
        if position[0] >= rows || position[1] >= cols {
            return Err(invariant_violation(
                "PaddedCanvas::write_pixel",
                &format!("pixel {position:?} outside {rows}x{cols} output"),
            ));
        }
        if values.len() != channels {
            return Err(invariant_violation(
                "PaddedCanvas::write_pixel",
                &format!("{} channel values for a {channels}-channel output", values.len()),
            ));
        }
        if self.is_filled(position) {
            return Err(invariant_violation(
                "PaddedCanvas::write_pixel",
                &format!("pixel {position:?} is already filled"),
            ));
        }

        let [r, c] = position;
        let pad = self.window_size / 2;
        self.output.slice_mut(s![r, c, ..]).assign(&values);
        self.padded_output
            .slice_mut(s![r + pad, c + pad, ..])
            .assign(&values);
        if let Some(flag) = self.filled.get_mut(position) {
            *flag = true;
        }
        if let Some(flag) = self.padded_filled.get_mut([r + pad, c + pad]) {
            *flag = true;
        }
        Ok(())
    }

    /// Copy the canonical buffers into the center of the padded mirrors
    pub fn resync(&mut self) {
        let (rows, cols) = self.dims();
        let pad = self.window_size / 2;
        self.padded_output
            .slice_mut(s![pad..pad + rows, pad..pad + cols, ..])
            .assign(&self.output);
        self.padded_filled
            .slice_mut(s![pad..pad + rows, pad..pad + cols])
            .assign(&self.filled);
    }

    /// Whether the padded mirrors agree with the canonical buffers
    pub fn is_synced(&self) -> bool {
        let (rows, cols) = self.dims();
        let pad = self.window_size / 2;
        self.padded_output
            .slice(s![pad..pad + rows, pad..pad + cols, ..])
            == self.output
            && self
                .padded_filled
                .slice(s![pad..pad + rows, pad..pad + cols])
                == self.filled
    }
}
