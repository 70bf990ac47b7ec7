//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the helper layer.

use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use crate::config::LoggingConfig;
use crate::utils::errors::{IntlError, Result};

/// Initialize logging based on configuration
///
/// The returned guard flushes the file appender on drop, so keep it alive
/// for as long as the process logs.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(&config.file_path, "template-intl.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking))
        .try_init()
        .map_err(|e| IntlError::Config(format!("Failed to initialize logging: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log a helper call that failed
pub fn log_helper_failure(helper: &str, error: &IntlError) {
    warn!(
        helper = helper,
        category = %error.category(),
        error = %error,
        "Helper call failed"
    );
}

/// Log construction of a new formatter instance
pub fn log_formatter_built(kind: &str, locales: &[String], cached_entries: usize) {
    debug!(
        kind = kind,
        locales = ?locales,
        cached_entries = cached_entries,
        "Formatter constructed and cached"
    );
}
