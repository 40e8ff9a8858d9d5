//! Tracing setup: stdout plus rolling `whatsapp_bot` and `errors` log files.

use std::path::Path;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::error::ConfigError;

/// Rotated files kept per log.
const MAX_LOG_FILES: usize = 5;

/// Keeps the non-blocking log writers flushing. Hold for the process lifetime.
pub struct LogGuards {
    _guards: Vec<WorkerGuard>,
}

fn rolling_file(dir: &Path, prefix: &str) -> Result<RollingFileAppender, ConfigError> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .max_log_files(MAX_LOG_FILES)
        .build(dir)
        .map_err(|e| ConfigError::Logging(e.to_string()))
}

/// Install the global subscriber. `RUST_LOG` overrides the default `info`.
///
/// `whatsapp_bot.*.log` gets everything that passes the filter,
/// `errors.*.log` only ERROR events.
pub fn init(log_dir: &Path) -> Result<LogGuards, ConfigError> {
    std::fs::create_dir_all(log_dir)?;

    let (all_writer, all_guard) =
        tracing_appender::non_blocking(rolling_file(log_dir, "whatsapp_bot")?);
    let (error_writer, error_guard) =
        tracing_appender::non_blocking(rolling_file(log_dir, "errors")?);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(fmt::layer().with_ansi(false).with_writer(all_writer))
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(error_writer.with_max_level(Level::ERROR)),
        )
        .try_init()
        .map_err(|e| ConfigError::Logging(e.to_string()))?;

    tracing::info!(dir = %log_dir.display(), "Logging configured");

    Ok(LogGuards {
        _guards: vec![all_guard, error_guard],
    })
}
