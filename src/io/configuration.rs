//! Algorithm constants and runtime configuration defaults

// Classic Efros-Leung parameterization
/// Window side length used when none is requested
pub const DEFAULT_WINDOW_SIZE: usize = 11;
/// Smallest usable window; a 1-pixel window never sees a filled neighbor
pub const MIN_WINDOW_SIZE: usize = 3;
/// Side length of the seed patch copied into the output center
pub const DEFAULT_SEED_SIZE: usize = 3;
/// Relative slack admitted around the best distance when forming the near-optimal set
pub const ERROR_TOLERANCE: f64 = 0.1;
/// Starting value of the adaptive acceptance threshold
pub const INITIAL_MAX_ERROR_THRESHOLD: f64 = 0.3;
/// Factor applied to the acceptance threshold after a pass with no accepted pixels
pub const THRESHOLD_GROWTH_FACTOR: f64 = 1.1;
/// Gaussian standard deviation is the window size divided by this value
pub const GAUSSIAN_SIGMA_DIVISOR: f64 = 6.4;

// Safety limit to prevent excessive memory allocation
/// Maximum allowed output dimension
pub const MAX_OUTPUT_DIMENSION: usize = 10_000;

/// Output size multiplier applied to the sample when no size is given
pub const DEFAULT_OUTPUT_SCALE: usize = 2;

// Progress bar display settings
/// Threshold for switching to batch progress mode
pub const MAX_INDIVIDUAL_PROGRESS_BARS: usize = 5;

/// Fixed seed for reproducible generation
pub const DEFAULT_SEED: u64 = 42;

// Output settings
/// Suffix added to output filenames
pub const OUTPUT_SUFFIX: &str = "_synth";
/// Delay between GIF animation frames
pub const GIF_FRAME_DELAY_MS: u32 = 20;
/// Minimum frame delay that viewers reliably support (in milliseconds)
pub const VIEWER_MIN_FRAME_DELAY_MS: u32 = 50;
