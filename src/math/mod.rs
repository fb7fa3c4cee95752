//! Mathematical utilities for the synthesis engine

/// Gaussian kernel construction for spatial weighting
pub mod kernel;
