//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::constants::{
    DEFAULT_OUTPUT, DEFAULT_USER_AGENT, DEFAULT_WORKERS, MAX_REDIRECTS, PROGRESS_INTERVAL_SECS,
    REQUEST_TIMEOUT_SECS, RESPONSE_HEADER_TIMEOUT_SECS, STDIN_INPUT, TCP_CONNECT_TIMEOUT_SECS,
    TLS_HANDSHAKE_TIMEOUT_SECS,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Scan configuration.
///
/// Parsed from the command line by the binary, or built programmatically by
/// library users.
///
/// # Examples
///
/// ```no_run
/// use host_scan::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     output: Some(PathBuf::from("scan.json")),
///     workers: 50,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Parser)]
#[command(name = "host_scan", version, about)]
pub struct Config {
    /// File to read hostnames from, one per line ("-" reads stdin)
    #[arg(long, default_value = STDIN_INPUT)]
    pub input: PathBuf,

    /// Output file receiving one JSON record per host
    #[arg(long, default_value = DEFAULT_OUTPUT)]
    pub output: Option<PathBuf>,

    /// Number of parallel probe workers (minimum 1)
    #[arg(long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Capacity of the hostname queue (defaults to the worker count)
    #[arg(long)]
    pub queue_capacity: Option<usize>,

    /// Seconds between progress lines
    #[arg(long, default_value_t = PROGRESS_INTERVAL_SECS)]
    pub progress_interval_secs: u64,

    /// TCP connect timeout in seconds
    #[arg(long, default_value_t = TCP_CONNECT_TIMEOUT_SECS)]
    pub connect_timeout_secs: u64,

    /// TLS handshake timeout in seconds
    #[arg(long, default_value_t = TLS_HANDSHAKE_TIMEOUT_SECS)]
    pub tls_handshake_timeout_secs: u64,

    /// Timeout waiting for response headers, in seconds
    #[arg(long, default_value_t = RESPONSE_HEADER_TIMEOUT_SECS)]
    pub response_header_timeout_secs: u64,

    /// Overall timeout for one fetch including redirects, in seconds
    #[arg(long, default_value_t = REQUEST_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,

    /// Maximum number of requests made while following redirects
    #[arg(long, default_value_t = MAX_REDIRECTS)]
    pub max_redirects: usize,

    /// HTTP User-Agent header value
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

impl Config {
    /// Worker count, never below one.
    pub fn worker_count(&self) -> usize {
        self.workers.max(1)
    }

    /// Hostname queue capacity, never below one.
    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity.unwrap_or(self.workers).max(1)
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_secs(self.progress_interval_secs.max(1))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn tls_handshake_timeout(&self) -> Duration {
        Duration::from_secs(self.tls_handshake_timeout_secs)
    }

    pub fn response_header_timeout(&self) -> Duration {
        Duration::from_secs(self.response_header_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: PathBuf::from(STDIN_INPUT),
            output: Some(PathBuf::from(DEFAULT_OUTPUT)),
            workers: DEFAULT_WORKERS,
            queue_capacity: None,
            progress_interval_secs: PROGRESS_INTERVAL_SECS,
            connect_timeout_secs: TCP_CONNECT_TIMEOUT_SECS,
            tls_handshake_timeout_secs: TLS_HANDSHAKE_TIMEOUT_SECS,
            response_header_timeout_secs: RESPONSE_HEADER_TIMEOUT_SECS,
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
            max_redirects: MAX_REDIRECTS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}
