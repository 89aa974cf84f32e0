//! Log output to stderr, sharing the terminal with the render progress bar.

use std::sync::LazyLock;

use anyhow::Context as _;

/// Command line options for stderr log output.
#[derive(Clone, Debug, clap::Args)]
#[expect(clippy::module_name_repetitions)]
pub struct LoggingArgs {
    /// Log per-stage detail as well as the summary.
    #[arg(long = "verbose", short = 'v')]
    pub verbose: bool,

    /// Omit timestamps, for tests that compare stderr.
    #[arg(long = "simplify-log-format", hide = true)]
    pub(crate) simplify_log_format: bool,
}

impl LoggingArgs {
    fn level(&self) -> log::LevelFilter {
        if self.verbose {
            log::LevelFilter::Trace
        } else {
            log::LevelFilter::Info
        }
    }
}

/// Installs the global [`log`] logger, writing to stderr.
///
/// Fails if a logger was already installed.
pub fn install(options: &LoggingArgs) -> Result<(), anyhow::Error> {
    use log::LevelFilter::{Error, Off};

    // Target filtering is done by `accepts()`, not by simplelog.
    let config = simplelog::ConfigBuilder::new()
        .set_target_level(Off)
        .set_location_level(Off)
        .set_time_level(if options.simplify_log_format {
            Off
        } else {
            Error
        })
        .build();
    let inner = *simplelog::WriteLogger::new(options.level(), config, std::io::stderr());

    log::set_boxed_logger(Box::new(ProgressAwareLogger { inner }))
        .context("a logger is already installed")?;
    log::set_max_level(options.level());
    Ok(())
}

fn accepts(metadata: &log::Metadata<'_>) -> bool {
    blocktrace::util::standard_filter(metadata)
}

/// Hides the progress bars while each record is written so lines do not interleave.
struct ProgressAwareLogger {
    inner: simplelog::WriteLogger<std::io::Stderr>,
}

impl log::Log for ProgressAwareLogger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        accepts(metadata) && self.inner.enabled(metadata)
    }

    fn log(&self, record: &log::Record<'_>) {
        if accepts(record.metadata()) {
            PROGRESS_BARS.suspend(|| self.inner.log(record));
        }
    }

    fn flush(&self) {
        PROGRESS_BARS.suspend(|| self.inner.flush());
    }
}

/// Every progress bar is drawn through this, so the logger can suspend them all.
static PROGRESS_BARS: LazyLock<indicatif::MultiProgress> =
    LazyLock::new(indicatif::MultiProgress::new);

/// Creates a progress bar counting `passes` render passes, labelled with `label`.
pub fn new_progress_bar(passes: u64, label: &'static str) -> indicatif::ProgressBar {
    PROGRESS_BARS.add(
        indicatif::ProgressBar::new(passes)
            .with_style(pass_progress_style())
            .with_prefix(label),
    )
}

#[allow(clippy::literal_string_with_formatting_args)]
const PROGRESS_TEMPLATE: &str = "{prefix:8} {elapsed:>4} {wide_bar} {pos}/{len} passes {msg}";

fn pass_progress_style() -> indicatif::ProgressStyle {
    indicatif::ProgressStyle::default_bar()
        .template(PROGRESS_TEMPLATE)
        .unwrap_or_else(|_| indicatif::ProgressStyle::default_bar())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_raises_level() {
        let args = |verbose| LoggingArgs {
            verbose,
            simplify_log_format: false,
        };
        assert_eq!(args(false).level(), log::LevelFilter::Info);
        assert_eq!(args(true).level(), log::LevelFilter::Trace);
    }

    #[test]
    fn per_path_trace_is_dropped() {
        let metadata = log::Metadata::builder()
            .target("blocktrace::integrator")
            .level(log::Level::Trace)
            .build();
        assert!(!accepts(&metadata));
    }

    #[test]
    fn progress_template_is_valid() {
        indicatif::ProgressStyle::default_bar()
            .template(PROGRESS_TEMPLATE)
            .unwrap();
    }
}
