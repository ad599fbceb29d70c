//! Logger initialisation

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use colored::{ColoredString, Colorize};
use log::{self, info};
use std::fmt::{self, Display};
use thiserror::Error;

// Internal imports
use crate::session;

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("Expected a log level of at least `INFO`, found `{0}`")]
    InvalidMinLogLevel(log::LevelFilter),

    #[error("Error initialising the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("An error occured while setting up the logger: {0}")]
    FernInitError(log::SetLoggerError),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution.
///
/// Records go to stdout, with coloured level tags, and to the session's log
/// file as plain text. Records below `INFO` from any target starting with
/// one of `file_only_targets` are written to the log file only, which keeps
/// per-sample diagnostics off the terminal.
///
/// # Notes
///
/// - `min_level` must not filter out `INFO` records.
/// - Only the first call in a process can succeed, later calls return
///   `FernInitError`.
pub fn logger_init(
    min_level: LevelFilter,
    session: &session::Session,
    file_only_targets: &[&'static str],
) -> Result<(), LoggerInitError> {
    if min_level < log::Level::Info {
        return Err(LoggerInitError::InvalidMinLogLevel(min_level));
    }

    let log_file =
        fern::log_file(&session.log_file_path).map_err(LoggerInitError::LogFileInitError)?;

    let mut stdout = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}",
                format_record(message, record, coloured_tag(record.level()))
            ))
        })
        .chain(std::io::stdout());
    for target in file_only_targets {
        stdout = stdout.level_for(*target, LevelFilter::Info);
    }

    let file = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}",
                format_record(message, record, level_tag(record.level()))
            ))
        })
        .chain(log_file);

    fern::Dispatch::new()
        .level(min_level)
        .chain(stdout)
        .chain(file)
        .apply()
        .map_err(LoggerInitError::FernInitError)?;

    info!("Logging initialised");
    if let Some(epoch) = session::get_epoch() {
        info!("    Session epoch: {}", epoch);
    }
    info!("    Log level: {:?}", min_level);
    info!("    Log file path: {:?}", session.log_file_path);
    if !file_only_targets.is_empty() {
        info!("    File only targets: {}", file_only_targets.join(", "));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Format one record. Debug and trace records carry their target.
fn format_record<T: Display>(message: &fmt::Arguments, record: &log::Record, tag: T) -> String {
    if record.level() > log::Level::Info {
        format!(
            "[{:10.6} {}] {}: {}",
            session::get_elapsed_seconds(),
            tag,
            record.target(),
            message
        )
    } else {
        format!(
            "[{:10.6} {}] {}",
            session::get_elapsed_seconds(),
            tag,
            message
        )
    }
}

/// Get the three letter tag of a log level
fn level_tag(level: log::Level) -> &'static str {
    match level {
        log::Level::Trace => "TRC",
        log::Level::Debug => "DBG",
        log::Level::Info => "INF",
        log::Level::Warn => "WRN",
        log::Level::Error => "ERR",
    }
}

/// Get the terminal representation of a log level
fn coloured_tag(level: log::Level) -> ColoredString {
    let tag = level_tag(level);
    match level {
        log::Level::Trace => tag.dimmed().italic(),
        log::Level::Debug => tag.dimmed(),
        log::Level::Info => tag.normal(),
        log::Level::Warn => tag.yellow(),
        log::Level::Error => tag.red().bold(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn line(level: log::Level, target: &str, msg: &str) -> String {
        format_record(
            &format_args!("{}", msg),
            &log::Record::builder()
                .level(level)
                .target(target)
                .args(format_args!("{}", msg))
                .build(),
            level_tag(level),
        )
    }

    #[test]
    fn test_format_record() {
        let debug = line(log::Level::Debug, "race_lib::tube::frame", "degenerate tangent");
        assert!(debug.ends_with(" DBG] race_lib::tube::frame: degenerate tangent"));

        let warn = line(log::Level::Warn, "track_if::track", "suffix used");
        assert!(warn.ends_with(" WRN] suffix used"));
        assert!(!warn.contains("track_if"));
    }
}
