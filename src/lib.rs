//! Non-parametric texture synthesis by patch growing (Efros & Leung, 1999)
//!
//! A small seed patch from the sample is planted in the middle of a blank
//! output, which then grows outward one onion-skin layer at a time. Each new
//! pixel copies the center of a sample window whose Gaussian-weighted
//! distance to the already synthesized neighborhood is near-optimal.

#![deny(unsafe_code)]

/// Input/output collaborators, configuration and error handling
pub mod io;
/// Mathematical utilities for spatial weighting
pub mod math;
/// Core synthesis engine: candidate index, frontier, matching and growth
pub mod synthesis;

pub use io::error::{Result, SynthesisError};
pub use synthesis::{
    CommitPolicy, PassObserver, PassReport, PixelBuffer, SynthesisConfig, SynthesisEngine,
    synthesize, synthesize_with_config,
};
