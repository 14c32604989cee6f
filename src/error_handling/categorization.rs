//! Error categorization.
//!
//! Maps fetch errors onto the coarse categories reported in run statistics.

use super::stats::ProcessingStats;
use super::types::{ErrorType, FetchError};

/// Categorizes a [`FetchError`] into an [`ErrorType`].
pub fn categorize_fetch_error(error: &FetchError) -> ErrorType {
    match error {
        FetchError::InvalidUrl { .. }
        | FetchError::UnsupportedScheme(_)
        | FetchError::InvalidServerName(_) => ErrorType::InvalidUrl,
        FetchError::Connect { .. } => ErrorType::ConnectError,
        FetchError::ConnectTimeout { .. } => ErrorType::ConnectTimeout,
        FetchError::TlsHandshake { .. } => ErrorType::TlsHandshakeError,
        FetchError::TlsHandshakeTimeout { .. } => ErrorType::TlsHandshakeTimeout,
        FetchError::Http(_) | FetchError::RequestBuild(_) => ErrorType::HttpProtocolError,
        FetchError::ResponseHeaderTimeout { .. } => ErrorType::ResponseHeaderTimeout,
        FetchError::RequestTimeout { .. } => ErrorType::RequestTimeout,
        FetchError::TooManyRedirects(_) => ErrorType::TooManyRedirects,
        FetchError::InvalidRedirect { .. } => ErrorType::InvalidRedirect,
        FetchError::NoObservations(_) => ErrorType::NoResponses,
    }
}

/// Updates processing statistics based on a [`FetchError`].
pub fn update_error_stats(stats: &ProcessingStats, error: &FetchError) {
    stats.increment_error(categorize_fetch_error(error));
}
