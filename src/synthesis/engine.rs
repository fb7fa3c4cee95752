use ndarray::{Array2, Array3, ArrayView1, ArrayView3, s};
use rand::Rng;

use crate::{
    io::configuration::{
        DEFAULT_SEED_SIZE, DEFAULT_WINDOW_SIZE, ERROR_TOLERANCE, INITIAL_MAX_ERROR_THRESHOLD,
        THRESHOLD_GROWTH_FACTOR,
    },
    io::error::{Result, SynthesisError, invalid_parameter, invariant_violation},
    synthesis::frontier::{filled_count, growth_frontier},
    synthesis::matching::{MatchOutcome, MatchSelector},
    synthesis::neighborhood::PaddedCanvas,
    synthesis::patches::PatchIndex,
    synthesis::seed::{plant_seed, validate_seed_dimensions},
};

/// Multi-channel real-valued image shaped `(rows, cols, channels)`
pub type PixelBuffer = Array3<f64>;

/// When accepted pixels become visible to the rest of a pass
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CommitPolicy {
    /// Each accepted pixel is written before the next frontier pixel is
    /// matched, so pixels later in a pass see earlier ones as context
    #[default]
    Immediate,
    /// Accepted pixels are buffered and written once the whole frontier has
    /// been matched against the state at the start of the pass
    EndOfPass,
}

/// Parameters controlling window matching and threshold adaptation
#[derive(Clone, Copy, Debug)]
pub struct SynthesisConfig {
    /// Requested window side length (even values are rounded up)
    pub window_size: usize,
    /// Side length of the seed patch
    pub seed_size: usize,
    /// Relative slack of the near-optimal candidate set
    pub error_tolerance: f64,
    /// Starting acceptance threshold
    pub initial_max_error_threshold: f64,
    /// Multiplier applied to the threshold after a pass without progress
    pub threshold_growth_factor: f64,
    /// Visibility of accepted pixels within a pass
    pub commit_policy: CommitPolicy,
    /// Optional cap on the number of growing passes
    pub max_passes: Option<usize>,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            seed_size: DEFAULT_SEED_SIZE,
            error_tolerance: ERROR_TOLERANCE,
            initial_max_error_threshold: INITIAL_MAX_ERROR_THRESHOLD,
            threshold_growth_factor: THRESHOLD_GROWTH_FACTOR,
            commit_policy: CommitPolicy::Immediate,
            max_passes: None,
        }
    }
}

impl SynthesisConfig {
    /// Default configuration with a specific window size
    pub fn with_window_size(window_size: usize) -> Self {
        Self {
            window_size,
            ..Self::default()
        }
    }

    /// Check numeric parameters
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The error tolerance is negative or not finite
    /// - The initial threshold is not positive
    /// - The growth factor does not exceed one
    /// - The pass cap is zero
    pub fn validate(&self) -> Result<()> {
        if !self.error_tolerance.is_finite() || self.error_tolerance < 0.0 {
            return Err(invalid_parameter(
                "error_tolerance",
                &self.error_tolerance,
                &"must be a finite non-negative number",
            ));
        }
        if !self.initial_max_error_threshold.is_finite() || self.initial_max_error_threshold <= 0.0
        {
            return Err(invalid_parameter(
                "initial_max_error_threshold",
                &self.initial_max_error_threshold,
                &"must be a finite positive number",
            ));
        }
        if !self.threshold_growth_factor.is_finite() || self.threshold_growth_factor <= 1.0 {
            return Err(invalid_parameter(
                "threshold_growth_factor",
                &self.threshold_growth_factor,
                &"must be greater than one or synthesis may never finish",
            ));
        }
        if self.max_passes == Some(0) {
            return Err(invalid_parameter(
                "max_passes",
                &0,
                &"at least one pass is needed",
            ));
        }
        Ok(())
    }
}

/// Lifecycle of a synthesis run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SynthesisState {
    /// Output not yet allocated; the next step plants the seed
    Seeding,
    /// Frontier passes are filling the output
    Growing,
    /// Every output pixel is filled
    Done,
}

/// Summary of one completed growing pass
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PassReport {
    /// One-based pass number
    pub pass: usize,
    /// Frontier size at the start of the pass
    pub frontier_len: usize,
    /// Pixels filled during the pass
    pub accepted: usize,
    /// Frontier pixels left unfilled
    pub rejected: usize,
    /// Filled pixels after the pass
    pub filled: usize,
    /// Total output pixels
    pub total: usize,
    /// Acceptance threshold after any relaxation at the end of the pass
    pub max_error_threshold: f64,
}

impl PassReport {
    /// Whether the pass relaxed the threshold instead of filling pixels
    pub const fn stalled(&self) -> bool {
        self.accepted == 0
    }
}

/// Receives a report, the current output and its filled mask after each pass
///
/// Observers only look; they cannot change synthesis state.
pub trait PassObserver {
    /// Called once per completed growing pass
    fn on_pass(&mut self, report: &PassReport, output: &PixelBuffer, filled: &Array2<bool>);
}

impl<F> PassObserver for F
where
    F: FnMut(&PassReport, &PixelBuffer, &Array2<bool>),
{
    fn on_pass(&mut self, report: &PassReport, output: &PixelBuffer, filled: &Array2<bool>) {
        self(report, output, filled);
    }
}

/// Efros-Leung synthesis session
///
/// Owns every piece of mutable state of one run: the padded output buffers,
/// the acceptance threshold and the pass counter. The sample is borrowed and
/// never modified, and the patch index built from it is shared read-only by
/// all per-pixel searches.
pub struct SynthesisEngine<'a, R: Rng> {
    sample: ArrayView3<'a, f64>,
    output_dims: (usize, usize),
    config: SynthesisConfig,
    index: PatchIndex,
    selector: MatchSelector,
    canvas: Option<PaddedCanvas>,
    state: SynthesisState,
    max_error_threshold: f64,
    pass: usize,
    match_calls: usize,
    rng: R,
}

impl<'a, R: Rng> SynthesisEngine<'a, R> {
    /// Validate inputs and index the sample
    ///
    /// No output buffer exists until the first [`step`](Self::step).
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The sample or output is smaller than the seed
    /// - The output exceeds the maximum supported dimension
    /// - The sample has no channels or contains non-finite values
    /// - The window is too small or does not fit in the sample
    /// - The configuration fails validation
    pub fn new(
        sample: ArrayView3<'a, f64>,
        output_rows: usize,
        output_cols: usize,
        config: SynthesisConfig,
        rng: R,
    ) -> Result<Self> {
        let (sample_rows, sample_cols, channels) = sample.dim();
        validate_seed_dimensions(
            (sample_rows, sample_cols),
            (output_rows, output_cols),
            config.seed_size,
        )?;
        config.validate()?;

        let max_dimension = crate::io::configuration::MAX_OUTPUT_DIMENSION;
        if output_rows > max_dimension || output_cols > max_dimension {
            return Err(invalid_parameter(
                "output dimensions",
                &format!("{output_rows}x{output_cols}"),
                &format!("each side must be at most {max_dimension}"),
            ));
        }
        if channels == 0 {
            return Err(invalid_parameter(
                "sample",
                &"0 channels",
                &"sample must have at least one channel",
            ));
        }
        if sample.iter().any(|v| !v.is_finite()) {
            return Err(invalid_parameter(
                "sample",
                &"non-finite value",
                &"every sample value must be finite",
            ));
        }

        let index = PatchIndex::build(sample, config.window_size)?;
        let selector = MatchSelector::new(config.error_tolerance);

        tracing::info!(
            "Synthesizing {output_rows}x{output_cols} from {sample_rows}x{sample_cols}x{channels} sample with {0}x{0} window, tolerance {1}",
            index.window_size(),
            selector.error_tolerance()
        );

        Ok(Self {
            sample,
            output_dims: (output_rows, output_cols),
            max_error_threshold: config.initial_max_error_threshold,
            config,
            index,
            selector,
            canvas: None,
            state: SynthesisState::Seeding,
            pass: 0,
            match_calls: 0,
            rng,
        })
    }

    /// Current lifecycle state
    pub const fn state(&self) -> SynthesisState {
        self.state
    }

    /// Current acceptance threshold
    pub const fn max_error_threshold(&self) -> f64 {
        self.max_error_threshold
    }

    /// Number of growing passes completed
    pub const fn passes(&self) -> usize {
        self.pass
    }

    /// Number of neighborhoods matched so far
    pub const fn match_calls(&self) -> usize {
        self.match_calls
    }

    /// Configuration in use
    pub const fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    /// Candidate table built from the sample
    pub const fn index(&self) -> &PatchIndex {
        &self.index
    }

    /// Output buffer, once seeded
    pub fn output(&self) -> Option<&PixelBuffer> {
        self.canvas.as_ref().map(PaddedCanvas::output)
    }

    /// Filled mask, once seeded
    pub fn filled(&self) -> Option<&Array2<bool>> {
        self.canvas.as_ref().map(PaddedCanvas::filled)
    }

    /// Padded output and mask, once seeded
    pub const fn canvas(&self) -> Option<&PaddedCanvas> {
        self.canvas.as_ref()
    }

    /// Total output pixel count
    pub const fn total_pixels(&self) -> usize {
        self.output_dims.0 * self.output_dims.1
    }

    /// Advance the state machine by one transition
    ///
    /// Seeding plants the seed; each growing step runs one full frontier
    /// pass. Returns the pass report when a pass ran, and `None` for the
    /// seeding step or once the output is complete.
    ///
    /// # Errors
    ///
    /// Returns an error if seeding fails, a neighborhood violates the
    /// frontier invariant, or the pass cap is exceeded
    pub fn step(&mut self) -> Result<Option<PassReport>> {
        match self.state {
            SynthesisState::Seeding => {
                self.seed()?;
                Ok(None)
            }
            SynthesisState::Growing => self.grow(),
            SynthesisState::Done => Ok(None),
        }
    }

    /// Drive the state machine to completion and return the output
    ///
    /// # Errors
    ///
    /// Returns the first error raised by [`step`](Self::step); no partial
    /// output is returned
    pub fn run(mut self, mut observer: Option<&mut dyn PassObserver>) -> Result<PixelBuffer> {
        while self.state != SynthesisState::Done {
            if let Some(report) = self.step()?
                && let (Some(obs), Some(canvas)) = (observer.as_deref_mut(), self.canvas.as_ref())
            {
                obs.on_pass(&report, canvas.output(), canvas.filled());
            }
        }

        tracing::info!(
            "Synthesis finished after {} passes, final threshold {:.4}",
            self.pass,
            self.max_error_threshold
        );

        self.canvas
            .map(PaddedCanvas::into_output)
            .ok_or_else(|| invariant_violation("SynthesisEngine::run", &"finished without output"))
    }

    fn seed(&mut self) -> Result<()> {
        let seeded = plant_seed(
            self.sample,
            self.output_dims.0,
            self.output_dims.1,
            self.config.seed_size,
            &mut self.rng,
        )?;
        self.canvas = Some(PaddedCanvas::new(
            seeded.output,
            seeded.filled,
            self.index.window_size(),
        )?);
        self.state = SynthesisState::Growing;
        Ok(())
    }

    fn grow(&mut self) -> Result<Option<PassReport>> {
        let canvas = self
            .canvas
            .as_mut()
            .ok_or_else(|| invariant_violation("SynthesisEngine::grow", &"growing before seeding"))?;

        let frontier = growth_frontier(canvas.filled());
        if frontier.is_empty() {
            self.state = SynthesisState::Done;
            return Ok(None);
        }

        let total = self.output_dims.0 * self.output_dims.1;
        if let Some(limit) = self.config.max_passes
            && self.pass >= limit
        {
            return Err(SynthesisError::PassLimitExceeded {
                passes: self.pass,
                filled: filled_count(canvas.filled()),
                total,
            });
        }
        self.pass += 1;

        let mut pending: Vec<([usize; 2], [usize; 2])> = Vec::new();
        let mut accepted = 0;

        for &position in &frontier {
            let neighborhood = canvas.neighborhood(position)?;
            self.match_calls += 1;
            let outcome = self.selector.select(
                &self.index,
                &neighborhood,
                self.max_error_threshold,
                &mut self.rng,
            )?;

            match outcome {
                MatchOutcome::Accepted(found) => {
                    accepted += 1;
                    match self.config.commit_policy {
                        CommitPolicy::Immediate => {
                            canvas.write_pixel(position, sample_pixel(self.sample, found.source))?;
                        }
                        CommitPolicy::EndOfPass => pending.push((position, found.source)),
                    }
                }
                MatchOutcome::Rejected(best) => {
                    tracing::trace!(
                        "Pass {}: pixel {position:?} rejected, error {:.5} >= {:.5}",
                        self.pass,
                        best.error,
                        self.max_error_threshold
                    );
                }
            }
        }

        for (position, source) in pending {
            canvas.write_pixel(position, sample_pixel(self.sample, source))?;
        }
        canvas.resync();

        if accepted == 0 {
            self.max_error_threshold *= self.config.threshold_growth_factor;
            tracing::debug!(
                "Pass {} stalled on {} pixels, threshold relaxed to {:.5}",
                self.pass,
                frontier.len(),
                self.max_error_threshold
            );
        }

        let report = PassReport {
            pass: self.pass,
            frontier_len: frontier.len(),
            accepted,
            rejected: frontier.len() - accepted,
            filled: filled_count(canvas.filled()),
            total,
            max_error_threshold: self.max_error_threshold,
        };

        tracing::debug!(
            "Pass {}: {}/{} frontier pixels filled, {}/{} total",
            report.pass,
            report.accepted,
            report.frontier_len,
            report.filled,
            report.total
        );

        Ok(Some(report))
    }
}

fn sample_pixel(sample: ArrayView3<'_, f64>, source: [usize; 2]) -> ArrayView1<'_, f64> {
    sample.slice_move(s![source[0], source[1], ..])
}

/// Synthesize an output texture with default parameters and a given window
///
/// # Errors
///
/// Returns `InvalidDimensions` if the sample or output is smaller than the
/// seed or the window does not fit the sample, and `InvalidParameter` for
/// unusable windows or sample contents
pub fn synthesize<R: Rng + ?Sized>(
    sample: &PixelBuffer,
    output_rows: usize,
    output_cols: usize,
    window_size: usize,
    rng: &mut R,
) -> Result<PixelBuffer> {
    synthesize_with_config(
        sample,
        output_rows,
        output_cols,
        &SynthesisConfig::with_window_size(window_size),
        rng,
        None,
    )
}

/// Synthesize an output texture with full control over parameters
///
/// # Errors
///
/// Returns any error raised by engine construction or by a pass
pub fn synthesize_with_config<R: Rng + ?Sized>(
    sample: &PixelBuffer,
    output_rows: usize,
    output_cols: usize,
    config: &SynthesisConfig,
    rng: &mut R,
    observer: Option<&mut dyn PassObserver>,
) -> Result<PixelBuffer> {
    let engine = SynthesisEngine::new(sample.view(), output_rows, output_cols, *config, rng)?;
    engine.run(observer)
}
