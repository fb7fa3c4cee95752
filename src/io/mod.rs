//! Collaborators around the synthesis core: files, terminal and errors

/// Command-line parsing and batch file processing
pub mod cli;
/// Algorithm constants and runtime defaults
pub mod configuration;
/// Error types shared by the whole crate
pub mod error;
/// Image decoding and encoding to and from pixel buffers
pub mod image;
/// Log backend cooperating with progress bars
pub mod logging;
/// Terminal progress display
pub mod progress;
/// Per-pass frame capture and GIF export
pub mod visualization;
