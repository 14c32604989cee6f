//! One fetch: a URL, its redirect chain, and an overall deadline.

use std::sync::Arc;
use std::time::Duration;

use log::debug;
use tokio::time::timeout;
use url::Url;

use crate::config::{Config, MAX_REDIRECTS, REQUEST_TIMEOUT_SECS};
use crate::error_handling::FetchError;
use crate::models::Observation;

use super::{RecordingTransport, RedirectClient, RoundTrip};

/// Limits applied to each fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchSettings {
    /// Budget for the whole fetch, redirects included.
    pub request_timeout: Duration,
    /// Maximum number of requests in one redirect chain.
    pub max_redirects: usize,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            max_redirects: MAX_REDIRECTS,
        }
    }
}

impl From<&Config> for FetchSettings {
    fn from(config: &Config) -> Self {
        Self {
            request_timeout: config.request_timeout(),
            max_redirects: config.max_redirects,
        }
    }
}

/// Hops captured by one fetch plus the error that ended it, if any.
///
/// `observations` holds every response received, in hop order, even when the
/// fetch failed part way through the chain.
#[derive(Debug, Default)]
pub struct Fetch {
    pub observations: Vec<Observation>,
    pub error: Option<FetchError>,
}

impl Fetch {
    /// The last hop captured.
    pub fn terminal(&self) -> Option<&Observation> {
        self.observations.last()
    }
}

/// Fetches `url`, following redirects, within `settings.request_timeout`.
///
/// Never retries. Each call records into its own fresh
/// [`RecordingTransport`] around the shared `transport`.
pub async fn fetch(transport: Arc<dyn RoundTrip>, url: &str, settings: &FetchSettings) -> Fetch {
    let start = match Url::parse(url) {
        Ok(start) => start,
        Err(e) => {
            return Fetch {
                observations: Vec::new(),
                error: Some(FetchError::InvalidUrl {
                    url: url.to_string(),
                    reason: e.to_string(),
                }),
            }
        }
    };

    let recorder = RecordingTransport::new(transport);
    let client = RedirectClient::new(&recorder, settings.max_redirects);
    let error = match timeout(settings.request_timeout, client.get(start)).await {
        Ok(Ok(_)) => None,
        Ok(Err(e)) => Some(e),
        Err(_) => Some(FetchError::RequestTimeout {
            url: url.to_string(),
            timeout: settings.request_timeout,
        }),
    };
    if let Some(e) = &error {
        debug!("Fetch of {url} failed after {} hop(s): {e}", recorder.len());
    }

    Fetch {
        observations: recorder.into_observations(),
        error,
    }
}
