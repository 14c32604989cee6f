//! Error type definitions.
//!
//! This module defines the error types raised while probing hosts and writing
//! results, plus the error and info categories tracked in run statistics.

use std::time::Duration;

use log::SetLoggerError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error building the TLS client configuration.
    #[error("TLS configuration error: {0}")]
    TlsConfigError(#[from] rustls::Error),
}

/// Errors raised by a single fetch (one scheme, redirects included).
///
/// These never abort a run: they end up as the `error` string of the host's
/// result record.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The URL could not be built or parsed.
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The URL uses a scheme other than http or https.
    #[error("unsupported scheme \"{0}\"")]
    UnsupportedScheme(String),

    /// Name resolution or TCP connect failed.
    #[error("connect to {addr} failed: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// TCP connect did not finish in time.
    #[error("connect to {addr} timed out after {timeout:?}")]
    ConnectTimeout { addr: String, timeout: Duration },

    /// The server name is not valid for SNI.
    #[error("invalid TLS server name {0}")]
    InvalidServerName(String),

    /// The TLS handshake failed (certificate, protocol or I/O error).
    #[error("TLS handshake with {host} failed: {source}")]
    TlsHandshake {
        host: String,
        #[source]
        source: std::io::Error,
    },

    /// The TLS handshake did not finish in time.
    #[error("TLS handshake with {host} timed out after {timeout:?}")]
    TlsHandshakeTimeout { host: String, timeout: Duration },

    /// HTTP protocol error on an established connection.
    #[error("HTTP error: {0}")]
    Http(#[from] hyper::Error),

    /// The request could not be constructed.
    #[error("request build error: {0}")]
    RequestBuild(#[from] http::Error),

    /// Response headers did not arrive in time.
    #[error("timeout awaiting response headers from {url} after {timeout:?}")]
    ResponseHeaderTimeout { url: String, timeout: Duration },

    /// The whole fetch, redirects included, ran out of time.
    #[error("request to {url} timed out after {timeout:?}")]
    RequestTimeout { url: String, timeout: Duration },

    /// The redirect chain was longer than allowed.
    #[error("stopped after {0} redirects")]
    TooManyRedirects(usize),

    /// A `Location` header could not be resolved to a URL.
    #[error("invalid redirect location {location:?} from {url}: {reason}")]
    InvalidRedirect {
        url: String,
        location: String,
        reason: String,
    },

    /// The fetch reported success but recorded no response.
    #[error("no responses recorded for {0}")]
    NoObservations(String),
}

/// Errors that end the collector's drain loop.
#[derive(Error, Debug)]
pub enum CollectorError {
    /// A result could not be serialized to JSON.
    #[error("failed to serialize result: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The output destination rejected a write or flush.
    #[error("failed to write output: {0}")]
    Write(#[from] std::io::Error),

    /// The collector task panicked or was cancelled.
    #[error("collector task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Categories of fetch failures tracked in run statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorType {
    InvalidUrl,
    ConnectError,
    ConnectTimeout,
    TlsHandshakeError,
    TlsHandshakeTimeout,
    HttpProtocolError,
    ResponseHeaderTimeout,
    RequestTimeout,
    TooManyRedirects,
    InvalidRedirect,
    NoResponses,
}

/// Informational metrics tracked per host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum InfoType {
    HttpOk,         // HTTP probe ended on a 200
    HttpsOk,        // HTTPS probe (or HTTP -> HTTPS redirect) ended on a 200
    HttpsOnly,      // HTTP probe already landed on https://
    Redirected,     // At least one redirect followed
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::InvalidUrl => "Invalid URL",
            ErrorType::ConnectError => "Connect error",
            ErrorType::ConnectTimeout => "Connect timeout",
            ErrorType::TlsHandshakeError => "TLS handshake error",
            ErrorType::TlsHandshakeTimeout => "TLS handshake timeout",
            ErrorType::HttpProtocolError => "HTTP protocol error",
            ErrorType::ResponseHeaderTimeout => "Response header timeout",
            ErrorType::RequestTimeout => "Request timeout",
            ErrorType::TooManyRedirects => "Too many redirects",
            ErrorType::InvalidRedirect => "Invalid redirect location",
            ErrorType::NoResponses => "No responses recorded",
        }
    }
}

impl InfoType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InfoType::HttpOk => "HTTP 200",
            InfoType::HttpsOk => "HTTPS 200",
            InfoType::HttpsOnly => "HTTP redirects to HTTPS",
            InfoType::Redirected => "Redirect followed",
        }
    }
}
