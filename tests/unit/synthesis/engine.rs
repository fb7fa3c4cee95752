//! Tests for the synthesis state machine and threshold adaptation

#[cfg(test)]
mod tests {
    use ndarray::{Array2, Array3};
    use patchgrow::synthesis::{SynthesisState, frontier::filled_count};
    use patchgrow::{
        CommitPolicy, PassReport, PixelBuffer, SynthesisConfig, SynthesisEngine, SynthesisError,
        synthesize_with_config,
    };
    use rand::{Rng, SeedableRng, rngs::StdRng};

    fn noise_sample(rows: usize, cols: usize, seed: u64) -> Array3<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        Array3::from_shape_simple_fn((rows, cols, 1), || rng.random::<f64>())
    }

    // Tests the lifecycle runs Seeding, Growing, Done and stays Done
    // Verified by skipping the transition out of Seeding
    #[test]
    fn test_state_transitions() {
        let sample = noise_sample(6, 6, 1);
        let mut engine = SynthesisEngine::new(
            sample.view(),
            5,
            5,
            SynthesisConfig::with_window_size(3),
            StdRng::seed_from_u64(2),
        )
        .expect("engine");

        assert_eq!(engine.state(), SynthesisState::Seeding);
        assert!(engine.output().is_none());

        assert_eq!(engine.step().expect("seed step"), None);
        assert_eq!(engine.state(), SynthesisState::Growing);
        assert_eq!(engine.filled().map(filled_count), Some(9));

        let mut guard = 0;
        while engine.state() != SynthesisState::Done {
            engine.step().expect("growing step");
            guard += 1;
            assert!(guard < 10_000, "Synthesis did not terminate");
        }

        assert_eq!(engine.step().expect("done step"), None);
        assert!(engine.filled().is_some_and(|f| f.iter().all(|&x| x)));
        assert!(engine.canvas().is_some_and(|c| c.is_synced()));
    }

    // Tests an output the size of the seed finishes without any matching
    // Verified by forcing one growing pass
    #[test]
    fn test_seed_sized_output_needs_no_matching() {
        let sample = noise_sample(5, 5, 3);
        let mut engine = SynthesisEngine::new(
            sample.view(),
            3,
            3,
            SynthesisConfig::with_window_size(3),
            StdRng::seed_from_u64(4),
        )
        .expect("engine");

        engine.step().expect("seed");
        assert_eq!(engine.step().expect("grow"), None);
        assert_eq!(engine.state(), SynthesisState::Done);
        assert_eq!(engine.match_calls(), 0);
        assert_eq!(engine.passes(), 0);
    }

    // Tests a stalled pass relaxes the threshold by the growth factor
    // Verified by resetting the threshold after a stall
    #[test]
    fn test_stall_relaxes_threshold() {
        let sample = noise_sample(8, 8, 5);
        let config = SynthesisConfig {
            initial_max_error_threshold: 1e-12,
            ..SynthesisConfig::with_window_size(3)
        };
        let mut engine =
            SynthesisEngine::new(sample.view(), 9, 9, config, StdRng::seed_from_u64(6))
                .expect("engine");

        engine.step().expect("seed");
        let mut saw_stall = false;
        while engine.state() != SynthesisState::Done {
            let before = engine.max_error_threshold();
            if let Some(report) = engine.step().expect("pass") {
                if report.stalled() {
                    saw_stall = true;
                    assert!((report.max_error_threshold - before * 1.1).abs() < 1e-18);
                    assert_eq!(report.rejected, report.frontier_len);
                } else {
                    assert!((report.max_error_threshold - before).abs() < f64::EPSILON);
                }
            }
        }
        assert!(saw_stall, "Noise sample never stalled at a tiny threshold");
    }

    // Tests thresholds and filled counts reported per pass never decrease
    // Verified by lowering the threshold after a successful pass
    #[test]
    fn test_reports_are_monotone() {
        let sample = noise_sample(7, 7, 8);
        let mut reports: Vec<PassReport> = Vec::new();
        let mut observer = |report: &PassReport, output: &PixelBuffer, filled: &Array2<bool>| {
            assert_eq!(output.dim().0, filled.dim().0);
            assert_eq!(filled_count(filled), report.filled);
            reports.push(*report);
        };

        let mut rng = StdRng::seed_from_u64(9);
        let output = synthesize_with_config(
            &sample,
            12,
            10,
            &SynthesisConfig::with_window_size(5),
            &mut rng,
            Some(&mut observer),
        )
        .expect("synthesis");

        assert_eq!(output.dim(), (12, 10, 1));
        assert!(!reports.is_empty());
        for pair in reports.windows(2) {
            assert_eq!(pair[1].pass, pair[0].pass + 1);
            assert!(pair[1].filled >= pair[0].filled);
            assert!(pair[1].max_error_threshold >= pair[0].max_error_threshold);
        }
        let last = reports.last().expect("at least one pass");
        assert_eq!(last.filled, last.total);
        assert_eq!(last.total, 120);
    }

    // Tests the pass cap aborts with the progress made so far
    // Verified by ignoring the cap
    #[test]
    fn test_pass_cap_exceeded() {
        let sample = noise_sample(6, 6, 10);
        let config = SynthesisConfig {
            max_passes: Some(1),
            ..SynthesisConfig::with_window_size(3)
        };
        let mut rng = StdRng::seed_from_u64(11);
        let err = synthesize_with_config(&sample, 20, 20, &config, &mut rng, None).unwrap_err();

        match err {
            SynthesisError::PassLimitExceeded {
                passes,
                filled,
                total,
            } => {
                assert_eq!(passes, 1);
                assert_eq!(total, 400);
                assert!(filled < total);
            }
            other => panic!("Unexpected error {other}"),
        }
    }

    // Tests end-of-pass commits grow the mask by exactly the accepted count
    // Verified by dropping buffered writes
    #[test]
    fn test_end_of_pass_commit_applies_all_accepted() {
        let sample = noise_sample(6, 6, 12);
        let config = SynthesisConfig {
            commit_policy: CommitPolicy::EndOfPass,
            ..SynthesisConfig::with_window_size(3)
        };
        let mut engine =
            SynthesisEngine::new(sample.view(), 8, 8, config, StdRng::seed_from_u64(13))
                .expect("engine");

        engine.step().expect("seed");
        let mut previous = 9;
        while let Some(report) = engine.step().expect("pass") {
            assert_eq!(report.filled, previous + report.accepted);
            previous = report.filled;
        }
        assert_eq!(previous, 64);
    }

    /// Run the seed step and the first growing pass on a 5x5 output
    ///
    /// The 3x3 sample is zero except for a bright center, so it has a single
    /// candidate window and the seed covers output rows and columns 1..4.
    fn first_pass(policy: CommitPolicy) -> (PassReport, PixelBuffer, Array2<bool>) {
        let sample = Array3::from_shape_fn((3, 3, 1), |(r, c, _)| {
            if r == 1 && c == 1 { 1.0 } else { 0.0 }
        });
        let config = SynthesisConfig {
            commit_policy: policy,
            initial_max_error_threshold: 1e-6,
            ..SynthesisConfig::with_window_size(3)
        };
        let mut engine =
            SynthesisEngine::new(sample.view(), 5, 5, config, StdRng::seed_from_u64(21))
                .expect("engine");

        engine.step().expect("seed");
        let report = engine.step().expect("pass").expect("first pass report");
        let output = engine.output().expect("output").clone();
        let filled = engine.filled().expect("mask").clone();
        (report, output, filled)
    }

    // Tests immediate commits feed later frontier pixels in the same pass
    // Verified by buffering writes under the immediate policy
    #[test]
    fn test_commit_policies_diverge_within_a_pass() {
        let (batched, batched_output, batched_filled) = first_pass(CommitPolicy::EndOfPass);
        assert_eq!(batched.frontier_len, 16);
        assert_eq!(batched.accepted, 16);
        assert_eq!(batched.filled, 25);
        assert!(batched_filled.iter().all(|&f| f));
        assert!((batched_output[[0, 1, 0]] - 1.0).abs() < f64::EPSILON);

        // Edge middles go first and write bright pixels that the two-neighbor
        // pixels then fail to match; corners only see the dark seed corner
        let (immediate, immediate_output, immediate_filled) = first_pass(CommitPolicy::Immediate);
        assert_eq!(immediate.frontier_len, 16);
        assert_eq!(immediate.accepted, 8);
        assert_eq!(immediate.rejected, 8);
        assert_eq!(immediate.filled, 17);

        for position in [[0, 2], [2, 0], [2, 4], [4, 2], [0, 0], [0, 4], [4, 0], [4, 4]] {
            assert!(immediate_filled[position], "{position:?} should be filled");
        }
        for position in [[0, 1], [0, 3], [1, 0], [1, 4], [3, 0], [3, 4], [4, 1], [4, 3]] {
            assert!(!immediate_filled[position], "{position:?} should be open");
        }
        assert!((immediate_output[[0, 2, 0]] - 1.0).abs() < f64::EPSILON);
        assert_ne!(batched_filled, immediate_filled);
    }

    // Tests unusable parameters are rejected before any work
    // Verified by removing the growth factor check
    #[test]
    fn test_config_validation() {
        assert!(SynthesisConfig::default().validate().is_ok());

        let cases = [
            SynthesisConfig {
                error_tolerance: -0.1,
                ..SynthesisConfig::default()
            },
            SynthesisConfig {
                initial_max_error_threshold: 0.0,
                ..SynthesisConfig::default()
            },
            SynthesisConfig {
                threshold_growth_factor: 1.0,
                ..SynthesisConfig::default()
            },
            SynthesisConfig {
                max_passes: Some(0),
                ..SynthesisConfig::default()
            },
        ];
        for config in cases {
            assert!(matches!(
                config.validate(),
                Err(SynthesisError::InvalidParameter { .. })
            ));
        }
    }

    // Tests samples with non-finite values are rejected
    // Verified by removing the finiteness scan
    #[test]
    fn test_non_finite_sample_rejected() {
        let mut sample = noise_sample(5, 5, 14);
        sample[[2, 3, 0]] = f64::NAN;
        let result = SynthesisEngine::new(
            sample.view(),
            6,
            6,
            SynthesisConfig::with_window_size(3),
            StdRng::seed_from_u64(0),
        );
        assert!(matches!(result, Err(SynthesisError::InvalidParameter { .. })));
    }

    // Tests oversized outputs are rejected before allocation
    // Verified by raising the maximum dimension
    #[test]
    fn test_oversized_output_rejected() {
        let sample = noise_sample(5, 5, 15);
        let result = SynthesisEngine::new(
            sample.view(),
            10,
            1_000_000,
            SynthesisConfig::with_window_size(3),
            StdRng::seed_from_u64(0),
        );
        assert!(matches!(result, Err(SynthesisError::InvalidParameter { .. })));
    }
}
