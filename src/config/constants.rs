//! Configuration constants.
//!
//! Defaults for every knob exposed by [`Config`](super::Config), plus the
//! fixed protocol values used by the transport.

use std::time::Duration;

/// Default number of concurrent probe workers.
pub const DEFAULT_WORKERS: usize = 10;

/// Default output destination (JSON Lines).
pub const DEFAULT_OUTPUT: &str = "results.json";

/// Input path that selects standard input.
pub const STDIN_INPUT: &str = "-";

/// Seconds between two progress lines.
pub const PROGRESS_INTERVAL_SECS: u64 = 5;

// Network operation timeouts
/// TCP connection timeout in seconds
pub const TCP_CONNECT_TIMEOUT_SECS: u64 = 5;
/// TLS handshake timeout in seconds
pub const TLS_HANDSHAKE_TIMEOUT_SECS: u64 = 3;
/// Time allowed between sending a request and receiving the response headers
pub const RESPONSE_HEADER_TIMEOUT_SECS: u64 = 5;
/// Overall budget for one fetch, redirects included
pub const REQUEST_TIMEOUT_SECS: u64 = 6;

/// Default User-Agent sent with every probe.
///
/// Identifies the survey to site operators rather than impersonating a browser.
pub const DEFAULT_USER_AGENT: &str = "httparchive.org";

// Redirect handling
/// Maximum number of requests made while following one redirect chain.
/// Matches the limit of most HTTP client stacks ("stopped after 10 redirects").
pub const MAX_REDIRECTS: usize = 10;

/// Redirect status codes that carry a `Location` to follow.
pub const REDIRECT_STATUSES: &[u16] = &[301, 302, 303, 307, 308];

/// Status code that marks a probe as successful.
pub const HTTP_STATUS_OK: u16 = 200;

/// ALPN protocols offered during the TLS handshake, most preferred first.
pub const ALPN_PROTOCOLS: &[&[u8]] = &[b"h2", b"http/1.1"];

/// Environment variable that forces debug logging when set to `true`.
pub const DEBUG_ENV_VAR: &str = "DEBUG";

/// Grace period for the progress reporter to stop after cancellation.
pub const PROGRESS_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);
