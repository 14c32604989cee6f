//! Error handling and processing statistics.
//!
//! This module provides:
//! - Error type definitions (fetch, collector, initialization)
//! - Processing statistics tracking (errors and info metrics)
//! - Error categorization for statistics
//!
//! Fetch errors are contained in the host's result record; only collector and
//! initialization errors are fatal to a run.

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::{categorize_fetch_error, update_error_stats};
pub use stats::ProcessingStats;
pub use types::{CollectorError, ErrorType, FetchError, InfoType, InitializationError};
