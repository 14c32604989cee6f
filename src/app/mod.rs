//! Run-level helpers.
//!
//! Host normalization for the input reader, the periodic progress line,
//! shutdown of the progress task, and the end-of-run statistics.

pub mod logging;
pub mod shutdown;
pub mod statistics;
pub mod url;

// Re-export public API
pub use logging::log_progress;
pub use shutdown::shutdown_gracefully;
pub use statistics::{print_error_statistics, print_run_summary};
pub use self::url::{normalize_host, probe_url};
