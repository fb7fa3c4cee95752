//! CLI entry point for Efros-Leung texture synthesis

use clap::Parser;
use patchgrow::io::cli::{Cli, FileProcessor};
use patchgrow::io::logging::{init_logging, level_for_verbosity};

fn main() -> patchgrow::Result<()> {
    let cli = Cli::parse();
    let level = level_for_verbosity(cli.verbose, cli.quiet);
    let mut processor = FileProcessor::new(cli);
    let multi_progress = processor
        .progress_manager()
        .map(patchgrow::io::progress::ProgressManager::multi_progress);
    init_logging(level, multi_progress);
    processor.process()
}
