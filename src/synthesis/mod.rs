//! Efros-Leung patch-growing synthesis engine

/// Seeding, frontier passes and threshold adaptation
pub mod engine;
/// Onion-skin frontier computation
pub mod frontier;
/// Gaussian-weighted partial-match candidate search
pub mod matching;
/// Neighborhood extraction from padded output buffers
pub mod neighborhood;
/// Sliding-window candidate table built from the sample
pub mod patches;
/// Random seed patch placement
pub mod seed;

pub use engine::{
    CommitPolicy, PassObserver, PassReport, PixelBuffer, SynthesisConfig, SynthesisEngine,
    SynthesisState, synthesize, synthesize_with_config,
};
