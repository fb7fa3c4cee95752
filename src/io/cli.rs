//! Command-line interface for batch texture synthesis from image samples

use crate::io::configuration::{
    DEFAULT_OUTPUT_SCALE, DEFAULT_SEED, DEFAULT_WINDOW_SIZE, GIF_FRAME_DELAY_MS, OUTPUT_SUFFIX,
};
use crate::io::error::{Result, SynthesisError, invalid_parameter};
use crate::io::image::{ChannelMode, export_pixel_buffer, load_sample};
use crate::io::progress::ProgressManager;
use crate::io::visualization::PassRecorder;
use crate::synthesis::{
    CommitPolicy, PassObserver, PassReport, PixelBuffer, SynthesisConfig, synthesize_with_config,
};
use clap::Parser;
use ndarray::Array2;
use rand::{SeedableRng, rngs::StdRng};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Image extensions picked up when the target is a directory
const SAMPLE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

#[derive(Parser, Debug)]
#[command(name = "patchgrow")]
#[command(
    author,
    version,
    about = "Grow large textures from small samples with Efros-Leung synthesis"
)]
/// Command-line arguments for the texture synthesis tool
pub struct Cli {
    /// Sample image or directory of samples to process
    #[arg(value_name = "TARGET")]
    pub target: PathBuf,

    /// Output width in pixels (implies square if height not specified)
    #[arg(short = 'w', long)]
    pub width: Option<usize>,

    /// Output height in pixels
    #[arg(short = 'H', long)]
    pub height: Option<usize>,

    /// Matching window side length (even values are rounded up)
    #[arg(short = 'k', long, default_value_t = DEFAULT_WINDOW_SIZE)]
    pub window: usize,

    /// Random seed for reproducible synthesis
    #[arg(short, long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Channel layout the sample is converted to
    #[arg(short, long, value_enum, default_value_t = ChannelMode::Rgb)]
    pub channels: ChannelMode,

    /// Give up after this many passes
    #[arg(long)]
    pub max_passes: Option<usize>,

    /// Apply accepted pixels at the end of each pass instead of immediately
    #[arg(long)]
    pub batch_commit: bool,

    /// Write an animated GIF of the pass-by-pass growth
    #[arg(long)]
    pub visualize: bool,

    /// Process files even if output exists
    #[arg(short, long)]
    pub no_skip: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase log verbosity (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Check if existing output files should be skipped
    pub const fn skip_existing(&self) -> bool {
        !self.no_skip
    }

    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Output `(rows, cols)` for a sample of the given size
    ///
    /// A single given side is used for both; with neither, the sample is
    /// scaled by [`DEFAULT_OUTPUT_SCALE`].
    pub const fn output_dimensions(&self, sample_rows: usize, sample_cols: usize) -> (usize, usize) {
        match (self.height, self.width) {
            (Some(h), Some(w)) => (h, w),
            (Some(h), None) => (h, h),
            (None, Some(w)) => (w, w),
            (None, None) => (
                sample_rows * DEFAULT_OUTPUT_SCALE,
                sample_cols * DEFAULT_OUTPUT_SCALE,
            ),
        }
    }

    /// Synthesis parameters selected on the command line
    pub fn synthesis_config(&self) -> SynthesisConfig {
        SynthesisConfig {
            commit_policy: if self.batch_commit {
                CommitPolicy::EndOfPass
            } else {
                CommitPolicy::Immediate
            },
            max_passes: self.max_passes,
            ..SynthesisConfig::with_window_size(self.window)
        }
    }
}

/// Forwards pass reports to the progress display and the GIF recorder
struct FileObserver<'a> {
    index: usize,
    progress: Option<&'a mut ProgressManager>,
    recorder: Option<&'a mut PassRecorder>,
}

impl PassObserver for FileObserver<'_> {
    fn on_pass(&mut self, report: &PassReport, output: &PixelBuffer, filled: &Array2<bool>) {
        if let Some(pm) = self.progress.as_deref_mut() {
            pm.update_pass(self.index, report);
        }
        if let Some(recorder) = self.recorder.as_deref_mut() {
            recorder.record(report, output, filled);
        }
    }
}

/// Orchestrates batch synthesis of sample files with progress tracking
pub struct FileProcessor {
    cli: Cli,
    progress_manager: Option<ProgressManager>,
}

impl FileProcessor {
    /// Create a new file processor with the given CLI arguments
    pub fn new(cli: Cli) -> Self {
        let progress_manager = cli.should_show_progress().then(ProgressManager::new);

        Self {
            cli,
            progress_manager,
        }
    }

    /// Progress display, when enabled
    pub const fn progress_manager(&self) -> Option<&ProgressManager> {
        self.progress_manager.as_ref()
    }

    /// Process files according to CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if target validation, sample loading, synthesis or
    /// export fails for any file
    pub fn process(&mut self) -> Result<()> {
        let files = self.collect_files()?;

        if files.is_empty() {
            tracing::warn!("No samples to process in {}", self.cli.target.display());
            return Ok(());
        }

        if let Some(ref mut pm) = self.progress_manager {
            pm.initialize(files.len());
        }

        for (index, file) in files.iter().enumerate() {
            self.process_file(file, index)?;
        }

        if let Some(ref mut pm) = self.progress_manager {
            pm.finish();
        }

        Ok(())
    }

    /// Gather the sample files named by the target
    ///
    /// # Errors
    ///
    /// Returns an error if the target is neither a supported image nor a
    /// readable directory
    pub fn collect_files(&self) -> Result<Vec<PathBuf>> {
        let target = &self.cli.target;
        if target.is_file() {
            if !is_sample_path(target) {
                return Err(invalid_parameter(
                    "target",
                    &target.display(),
                    &"target file must be a PNG, JPEG or BMP image",
                ));
            }
            if self.should_process_file(target) {
                Ok(vec![target.clone()])
            } else {
                Ok(vec![])
            }
        } else if target.is_dir() {
            let entries = std::fs::read_dir(target).map_err(|e| SynthesisError::FileSystem {
                path: target.clone(),
                operation: "read directory",
                source: e,
            })?;
            let mut files = Vec::new();
            for entry in entries {
                let path = entry?.path();
                if is_sample_path(&path)
                    && !is_generated_path(&path)
                    && self.should_process_file(&path)
                {
                    files.push(path);
                }
            }
            files.sort();
            Ok(files)
        } else {
            Err(invalid_parameter(
                "target",
                &target.display(),
                &"target must be an image file or directory",
            ))
        }
    }

    fn should_process_file(&self, input_path: &Path) -> bool {
        if !self.cli.skip_existing() {
            return true;
        }

        let output_path = output_path_for(input_path);
        if output_path.exists() {
            tracing::info!("Skipping: {} (output exists)", input_path.display());
            false
        } else {
            true
        }
    }

    fn process_file(&mut self, input_path: &Path, index: usize) -> Result<()> {
        let start_time = Instant::now();
        let output_path = output_path_for(input_path);

        let sample = load_sample(input_path, self.cli.channels)?;
        let (sample_rows, sample_cols, _) = sample.dim();
        let (rows, cols) = self.cli.output_dimensions(sample_rows, sample_cols);

        if let Some(ref mut pm) = self.progress_manager {
            pm.start_file(index, input_path, rows * cols);
        }

        let config = self.cli.synthesis_config();
        let mut rng = StdRng::seed_from_u64(self.cli.seed);
        let mut recorder = self.cli.visualize.then(PassRecorder::new);

        let mut observer = FileObserver {
            index,
            progress: self.progress_manager.as_mut(),
            recorder: recorder.as_mut(),
        };

        let output = synthesize_with_config(
            &sample,
            rows,
            cols,
            &config,
            &mut rng,
            Some(&mut observer),
        )?;

        export_pixel_buffer(&output, &output_path)?;

        if let Some(recorder) = recorder {
            recorder.export_gif(visualization_path_for(input_path), GIF_FRAME_DELAY_MS)?;
        }

        if let Some(ref mut pm) = self.progress_manager {
            pm.complete_file(index);
        }

        tracing::info!(
            "Synthesized {} -> {} ({rows}x{cols}) in {:.2?}",
            input_path.display(),
            output_path.display(),
            start_time.elapsed()
        );

        Ok(())
    }
}

fn is_sample_path(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| SAMPLE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

fn is_generated_path(path: &Path) -> bool {
    path.file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|stem| stem.ends_with(OUTPUT_SUFFIX))
}

fn sibling_path(input_path: &Path, file_name: String) -> PathBuf {
    if let Some(parent) = input_path.parent() {
        parent.join(file_name)
    } else {
        PathBuf::from(file_name)
    }
}

/// Path of the synthesized PNG written for a sample
pub fn output_path_for(input_path: &Path) -> PathBuf {
    let stem = input_path.file_stem().unwrap_or_default();
    sibling_path(
        input_path,
        format!("{}{}.png", stem.to_string_lossy(), OUTPUT_SUFFIX),
    )
}

/// Path of the growth animation written for a sample
pub fn visualization_path_for(input_path: &Path) -> PathBuf {
    let stem = input_path.file_stem().unwrap_or_default();
    sibling_path(
        input_path,
        format!("{}_growth.gif", stem.to_string_lossy()),
    )
}
