//! Logger initialization.

use std::io::Write;

use colored::*;
use log::LevelFilter;

use crate::config::{LogFormat, DEBUG_ENV_VAR};
use crate::error_handling::InitializationError;

/// Level to log at, given the level requested on the command line.
///
/// `DEBUG=true` in the environment forces at least debug output, so a scan can
/// be made verbose without touching its command line.
pub fn effective_log_level(requested: LevelFilter) -> LevelFilter {
    let forced = std::env::var(DEBUG_ENV_VAR)
        .map(|value| value.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if forced {
        requested.max(LevelFilter::Debug)
    } else {
        requested
    }
}

/// Initializes the logger with the specified level and format.
///
/// `RUST_LOG` is read first; `level` then overrides the global filter.
/// Connection-level chatter from `hyper`, `h2` and `rustls` is capped so that
/// debug runs stay readable.
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger is already installed.
///
/// # Examples
///
/// ```bash
/// # Debug output for this crate only
/// RUST_LOG=host_scan=debug host_scan --input hosts.txt
///
/// # Same, via the environment switch
/// DEBUG=true host_scan --input hosts.txt
/// ```
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    let mut builder = env_logger::Builder::from_default_env();

    builder.filter_level(level);
    builder.filter_module("hyper", LevelFilter::Info);
    builder.filter_module("hyper_util", LevelFilter::Info);
    builder.filter_module("h2", LevelFilter::Info);
    builder.filter_module("rustls", LevelFilter::Warn);
    builder.filter_module("host_scan", level);

    match format {
        LogFormat::Json => {
            builder.format(|buf, record| {
                writeln!(
                    buf,
                    "{{\"ts\":{},\"level\":\"{}\",\"target\":\"{}\",\"msg\":{}}}",
                    chrono::Utc::now().timestamp_millis(),
                    record.level(),
                    record.target(),
                    serde_json::to_string(&record.args().to_string())
                        .unwrap_or_else(|_| "\"\"".into())
                )
            });
        }
        LogFormat::Plain => {
            builder.format(|buf, record| {
                let level = record.level();
                let colored_level = match level {
                    log::Level::Error => level.to_string().red(),
                    log::Level::Warn => level.to_string().yellow(),
                    log::Level::Info => level.to_string().green(),
                    log::Level::Debug => level.to_string().blue(),
                    log::Level::Trace => level.to_string().purple(),
                };
                writeln!(
                    buf,
                    "{} {} [{}] {}",
                    chrono::Local::now().format("%H:%M:%S"),
                    record.target().cyan(),
                    colored_level,
                    record.args()
                )
            });
        }
    }

    builder.try_init().map_err(InitializationError::from)
}
