//! Hop recording decorator.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use url::Url;

use crate::error_handling::FetchError;
use crate::models::Observation;

use super::RoundTrip;

/// Wraps another [`RoundTrip`] and keeps a copy of every response it returns,
/// in the order the requests were made.
///
/// One recorder is created per fetch, so hops from different fetches never
/// mix even when they share the same engine. Because the recorder lives
/// outside the future that drives the redirect chain, the hops captured so far
/// survive that future being cancelled by a timeout.
pub struct RecordingTransport {
    inner: Arc<dyn RoundTrip>,
    observations: Mutex<Vec<Observation>>,
}

impl RecordingTransport {
    pub fn new(inner: Arc<dyn RoundTrip>) -> Self {
        Self {
            inner,
            observations: Mutex::new(Vec::new()),
        }
    }

    /// Number of hops recorded so far.
    pub fn len(&self) -> usize {
        self.observations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consumes the recorder, returning the hops in request order.
    pub fn into_observations(self) -> Vec<Observation> {
        self.observations
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl RoundTrip for RecordingTransport {
    async fn round_trip(&self, url: &Url) -> Result<Observation, FetchError> {
        let observation = self.inner.round_trip(url).await?;
        self.observations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observation.clone());
        Ok(observation)
    }
}
