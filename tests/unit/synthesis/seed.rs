//! Tests for seed patch placement

#[cfg(test)]
mod tests {
    use ndarray::{Array3, s};
    use patchgrow::SynthesisError;
    use patchgrow::synthesis::seed::{centered_origin, plant_seed, validate_seed_dimensions};
    use rand::{SeedableRng, rngs::StdRng};

    fn ramp(rows: usize, cols: usize, channels: usize) -> Array3<f64> {
        Array3::from_shape_fn((rows, cols, channels), |(r, c, ch)| {
            (r * 100 + c * 10 + ch) as f64
        })
    }

    // Tests the seed lands at the centered origin and copies sample values
    // Verified by placing the seed at the output origin
    #[test]
    fn test_seed_centered_and_copied() {
        let sample = ramp(6, 8, 3);
        let mut rng = StdRng::seed_from_u64(3);
        let seeded = plant_seed(sample.view(), 7, 7, 3, &mut rng).expect("seed");

        assert_eq!(seeded.target_origin, [2, 2]);
        assert_eq!(seeded.output.dim(), (7, 7, 3));

        let [sr, sc] = seeded.source_origin;
        assert!(sr <= 3 && sc <= 5);
        assert_eq!(
            seeded.output.slice(s![2..5, 2..5, ..]),
            sample.slice(s![sr..sr + 3, sc..sc + 3, ..])
        );

        let filled: Vec<[usize; 2]> = seeded
            .filled
            .indexed_iter()
            .filter(|&(_, &f)| f)
            .map(|((r, c), _)| [r, c])
            .collect();
        assert_eq!(filled.len(), 9);
        assert!(filled.iter().all(|&[r, c]| (2..5).contains(&r) && (2..5).contains(&c)));
    }

    // Tests an output the size of the seed is completely filled
    // Verified by shrinking the seed by one
    #[test]
    fn test_seed_fills_seed_sized_output() {
        let sample = ramp(4, 4, 1);
        let mut rng = StdRng::seed_from_u64(11);
        let seeded = plant_seed(sample.view(), 3, 3, 3, &mut rng).expect("seed");

        assert!(seeded.filled.iter().all(|&f| f));
        assert_eq!(seeded.target_origin, [0, 0]);
    }

    // Tests centering on odd and even outputs
    // Verified by rounding the center up
    #[test]
    fn test_centered_origin() {
        assert_eq!(centered_origin((7, 7), 3), [2, 2]);
        assert_eq!(centered_origin((8, 10), 3), [3, 4]);
        assert_eq!(centered_origin((3, 3), 3), [0, 0]);
    }

    // Tests undersized samples and outputs are rejected
    // Verified by removing the dimension checks
    #[test]
    fn test_seed_rejects_undersized_inputs() {
        let mut rng = StdRng::seed_from_u64(0);
        let small = ramp(2, 5, 1);
        assert!(matches!(
            plant_seed(small.view(), 10, 10, 3, &mut rng),
            Err(SynthesisError::InvalidDimensions { subject: "sample", .. })
        ));

        let sample = ramp(5, 5, 1);
        assert!(matches!(
            plant_seed(sample.view(), 10, 2, 3, &mut rng),
            Err(SynthesisError::InvalidDimensions { subject: "output", .. })
        ));
    }

    // Tests a zero seed size is rejected
    // Verified by letting an empty seed through
    #[test]
    fn test_seed_rejects_zero_size() {
        assert!(matches!(
            validate_seed_dimensions((5, 5), (5, 5), 0),
            Err(SynthesisError::InvalidParameter { .. })
        ));
        assert!(validate_seed_dimensions((3, 3), (3, 3), 3).is_ok());
    }
}
