//! Tracing subscriber setup that cooperates with progress bars
//!
//! Events are formatted by `tracing_subscriber::fmt` and written to stderr.
//! While bars are drawn each write happens inside `MultiProgress::suspend`
//! so that log lines and bars do not overwrite each other.

use indicatif::MultiProgress;
use std::io::{self, IsTerminal, Write};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

/// Map `-v` occurrences and `--quiet` to a level filter
///
/// Quiet mode keeps errors only; otherwise zero, one, two and three or more
/// `-v` flags select warn, info, debug and trace.
pub const fn level_for_verbosity(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::ERROR;
    }
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Build the event filter from a default level and optional extra directives
///
/// Directives use the `RUST_LOG` syntax and take precedence over the default
/// for the targets they name. Malformed directives are skipped.
pub fn filter_for(level: LevelFilter, directives: Option<&str>) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(level.into())
        .parse_lossy(directives.unwrap_or_default())
}

/// Stderr writer that suspends visible progress bars while writing
#[derive(Clone, Default)]
pub struct ProgressWriter {
    multi_progress: Option<MultiProgress>,
}

impl ProgressWriter {
    /// Create a writer, optionally coordinating with a set of bars
    pub const fn new(multi_progress: Option<MultiProgress>) -> Self {
        Self { multi_progress }
    }
}

impl Write for ProgressWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let write_all = || io::stderr().lock().write_all(buf).map(|()| buf.len());
        match self.multi_progress.as_ref().filter(|mp| !mp.is_hidden()) {
            Some(mp) => mp.suspend(write_all),
            None => write_all(),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

impl<'a> MakeWriter<'a> for ProgressWriter {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Install the global subscriber
///
/// `RUST_LOG` directives refine `level` per target. Installation only
/// succeeds once per process; later calls keep the first subscriber.
pub fn init_logging(level: LevelFilter, multi_progress: Option<MultiProgress>) {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = filter_for(level, directives.as_deref());

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(io::stderr().is_terminal())
        .with_writer(ProgressWriter::new(multi_progress));

    if Registry::default().with(filter).with(fmt_layer).try_init().is_err() {
        tracing::debug!("Subscriber already installed, keeping the existing one");
    }
}
