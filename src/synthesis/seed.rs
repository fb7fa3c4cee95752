//! Seeding the blank output with a random sample patch

use ndarray::{Array2, Array3, ArrayView3, s};
use rand::Rng;

use crate::io::error::{Result, ensure_min_dimensions, invalid_parameter};

/// Output buffer and filled mask right after seeding
#[derive(Debug, Clone)]
pub struct SeededCanvas {
    /// Zero-initialized output holding the seed patch
    pub output: Array3<f64>,
    /// Mask marking exactly the seed patch as filled
    pub filled: Array2<bool>,
    /// Top-left corner in the sample the patch was copied from
    pub source_origin: [usize; 2],
    /// Top-left corner in the output the patch was placed at
    pub target_origin: [usize; 2],
}

/// Check seeding preconditions without allocating anything
///
/// # Errors
///
/// Returns an error if the seed size is zero, or if the sample or the
/// requested output is smaller than the seed in either dimension
pub fn validate_seed_dimensions(
    sample_dims: (usize, usize),
    output_dims: (usize, usize),
    seed_size: usize,
) -> Result<()> {
    if seed_size == 0 {
        return Err(invalid_parameter(
            "seed_size",
            &seed_size,
            &"seed patch must cover at least one pixel",
        ));
    }
    ensure_min_dimensions("sample", sample_dims.0, sample_dims.1, seed_size)?;
    ensure_min_dimensions("output", output_dims.0, output_dims.1, seed_size)
}

/// Top-left output coordinate that centers a seed of the given size
pub const fn centered_origin(output_dims: (usize, usize), seed_size: usize) -> [usize; 2] {
    [
        output_dims.0 / 2 - seed_size / 2,
        output_dims.1 / 2 - seed_size / 2,
    ]
}

/// Copy a random `seed_size × seed_size` sample patch into the output center
///
/// # Errors
///
/// Returns `InvalidDimensions` if the sample or output is smaller than the
/// seed, and `InvalidParameter` for a zero seed size
pub fn plant_seed<R: Rng + ?Sized>(
    sample: ArrayView3<'_, f64>,
    output_rows: usize,
    output_cols: usize,
    seed_size: usize,
    rng: &mut R,
) -> Result<SeededCanvas> {
    let (sample_rows, sample_cols, channels) = sample.dim();
    validate_seed_dimensions(
        (sample_rows, sample_cols),
        (output_rows, output_cols),
        seed_size,
    )?;

    let source_origin = [
        rng.random_range(0..=sample_rows - seed_size),
        rng.random_range(0..=sample_cols - seed_size),
    ];
    let target_origin = centered_origin((output_rows, output_cols), seed_size);

    let [sr, sc] = source_origin;
    let [tr, tc] = target_origin;

    let mut output = Array3::zeros((output_rows, output_cols, channels));
    output
        .slice_mut(s![tr..tr + seed_size, tc..tc + seed_size, ..])
        .assign(&sample.slice(s![sr..sr + seed_size, sc..sc + seed_size, ..]));

    let mut filled = Array2::from_elem((output_rows, output_cols), false);
    filled
        .slice_mut(s![tr..tr + seed_size, tc..tc + seed_size])
        .fill(true);

    tracing::debug!(
        "Seeded {seed_size}x{seed_size} patch from sample {source_origin:?} at output {target_origin:?}"
    );

    Ok(SeededCanvas {
        output,
        filled,
        source_origin,
        target_origin,
    })
}
