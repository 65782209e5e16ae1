//! Logging utilities for bookcal.
//!
//! Every crate logs through `tracing`. The binary calls [`init`] once at start-up;
//! `RUST_LOG` still takes precedence over the configured level.

use bookcal_config::LoggingConfig;
use tracing::{error, info, level_filters::LevelFilter, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{filter::Directive, fmt, prelude::*, EnvFilter};

/// File name prefix of the rolling log file.
const LOG_FILE_PREFIX: &str = "bookcal.log";

fn build_filter(level: Level) -> EnvFilter {
    let directive: Directive = format!("bookcal={}", level)
        .parse()
        .unwrap_or_else(|_| LevelFilter::from_level(level).into());
    EnvFilter::from_default_env().add_directive(directive)
}

/// Initialize logging from the `[logging]` config section.
///
/// With `directory` set, log lines go to a daily rolling file in that
/// directory. The returned guard flushes the file writer on drop and must be
/// held for the lifetime of the program.
pub fn init(config: &LoggingConfig) -> Option<WorkerGuard> {
    let level = config.level.parse::<Level>().unwrap_or(Level::INFO);

    let Some(directory) = config.directory.as_deref() else {
        init_with_level(level);
        return None;
    };

    let appender = tracing_appender::rolling::daily(directory, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let result = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(build_filter(level))
        .try_init();

    if result.is_ok() {
        info!("Logging initialized at level {} into {}", level, directory);
    }
    Some(guard)
}

/// Initialize the tracing subscriber on stderr with a specific log level.
///
/// Calling it again after a subscriber is installed is a no-op.
pub fn init_with_level(level: Level) {
    let result = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(build_filter(level))
        .try_init();

    if result.is_ok() {
        info!("Logging initialized at level: {}", level);
    }
}

/// Log a result, INFO on success and ERROR on failure, and hand it back.
pub fn log_result<T, E: std::fmt::Display>(
    result: Result<T, E>,
    success_message: &str,
    error_context: &str,
) -> Result<T, E> {
    match &result {
        Ok(_) => info!("{}", success_message),
        Err(e) => error!("{}: {}", error_context, e),
    }
    result
}
