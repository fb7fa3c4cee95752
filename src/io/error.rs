//! Error types for synthesis and its image/file collaborators

use std::fmt;
use std::path::PathBuf;

/// Main error type for all synthesis operations
#[derive(Debug)]
pub enum SynthesisError {
    /// An image or window is too small for the requested operation
    InvalidDimensions {
        /// What was measured (sample, output, window)
        subject: &'static str,
        /// Rows of the offending buffer
        rows: usize,
        /// Columns of the offending buffer
        cols: usize,
        /// Smallest side length that would have been accepted
        minimum: usize,
    },

    /// Parameter validation failed
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// A condition that correct frontier semantics rule out was observed
    ///
    /// Indicates a logic defect rather than bad input.
    InternalInvariantViolation {
        /// Operation in which the violation surfaced
        operation: &'static str,
        /// Description of the violated invariant
        reason: String,
    },

    /// The caller-level pass cap was reached before the output was filled
    PassLimitExceeded {
        /// Passes executed before giving up
        passes: usize,
        /// Pixels filled when the cap was hit
        filled: usize,
        /// Total pixels in the output
        total: usize,
    },

    /// Failed to load a sample image from disk
    ImageLoad {
        /// Path to the image file
        path: PathBuf,
        /// Underlying image loading error
        source: image::ImageError,
    },

    /// Failed to save a synthesized image to disk
    ImageExport {
        /// Path where export was attempted
        path: PathBuf,
        /// Underlying image export error
        source: image::ImageError,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

impl fmt::Display for SynthesisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDimensions {
                subject,
                rows,
                cols,
                minimum,
            } => {
                write!(
                    f,
                    "Invalid dimensions: {subject} is {rows}x{cols}, both sides must be at least {minimum}"
                )
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::InternalInvariantViolation { operation, reason } => {
                write!(f, "Internal invariant violated in {operation}: {reason}")
            }
            Self::PassLimitExceeded {
                passes,
                filled,
                total,
            } => {
                write!(
                    f,
                    "Pass limit of {passes} reached with {filled}/{total} pixels filled"
                )
            }
            Self::ImageLoad { path, source } => {
                write!(f, "Failed to load image '{}': {source}", path.display())
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Failed to export image to '{}': {source}",
                    path.display()
                )
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for SynthesisError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source, .. } | Self::ImageExport { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for synthesis results
pub type Result<T> = std::result::Result<T, SynthesisError>;

impl From<std::io::Error> for SynthesisError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> SynthesisError {
    SynthesisError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create an internal invariant violation error
pub fn invariant_violation(operation: &'static str, reason: &impl ToString) -> SynthesisError {
    SynthesisError::InternalInvariantViolation {
        operation,
        reason: reason.to_string(),
    }
}

/// Reject a buffer whose sides are not both at least `minimum`
///
/// # Errors
///
/// Returns `InvalidDimensions` when either side is below `minimum`
pub const fn ensure_min_dimensions(
    subject: &'static str,
    rows: usize,
    cols: usize,
    minimum: usize,
) -> Result<()> {
    if rows < minimum || cols < minimum {
        return Err(SynthesisError::InvalidDimensions {
            subject,
            rows,
            cols,
            minimum,
        });
    }
    Ok(())
}
