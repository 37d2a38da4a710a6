//! Tracing subscriber setup.
//!
//! Diagnostics go to stderr. When [`LoggingConfig::file`] is set, a copy is
//! written to a daily rolling file under the logs directory.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::LoggingConfig;
use crate::error::{ReminderError, Result};

const LOG_FILE_PREFIX: &str = "siyam";
const MAX_LOG_FILES: usize = 7;

/// Filter from `RUST_LOG`, falling back to the configured level.
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

/// Install the global subscriber.
///
/// Keep the returned guard alive for as long as logs should reach the file;
/// dropping it flushes and stops the writer. Calling this when a subscriber
/// is already installed leaves the existing one in place.
///
/// # Errors
///
/// Returns an error if the log directory cannot be created or the file
/// appender cannot be built.
pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let stderr = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(env_filter(config));

    let (file, guard) = if config.file {
        let dir = config
            .directory
            .clone()
            .unwrap_or_else(crate::siyam_dirs::logs_dir);
        std::fs::create_dir_all(&dir)?;
        let appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix(LOG_FILE_PREFIX)
            .filename_suffix("log")
            .max_log_files(MAX_LOG_FILES)
            .build(&dir)
            .map_err(|e| ReminderError::Config(format!("log file appender: {e}")))?;
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(writer)
            .with_filter(env_filter(config));
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    if tracing_subscriber::registry()
        .with(stderr)
        .with(file)
        .try_init()
        .is_err()
    {
        tracing::debug!("tracing subscriber already installed");
    }
    Ok(guard)
}
