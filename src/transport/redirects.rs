//! Redirect chain following.
//!
//! Redirects are followed manually on top of a [`RoundTrip`] so that every hop
//! is visible to the layer underneath (in practice a
//! [`RecordingTransport`](super::RecordingTransport)).

use log::debug;
use url::Url;

use crate::config::REDIRECT_STATUSES;
use crate::error_handling::FetchError;
use crate::models::Observation;

use super::RoundTrip;

/// Whether `status` is a redirect that carries a `Location` to follow.
pub fn is_redirect(status: u16) -> bool {
    REDIRECT_STATUSES.contains(&status)
}

/// Follows redirect chains through a borrowed transport.
pub struct RedirectClient<'a> {
    transport: &'a dyn RoundTrip,
    max_redirects: usize,
}

impl<'a> RedirectClient<'a> {
    pub fn new(transport: &'a dyn RoundTrip, max_redirects: usize) -> Self {
        Self {
            transport,
            max_redirects,
        }
    }

    /// GETs `start` and follows redirects until a terminal response.
    ///
    /// A response is terminal when its status is not a redirect, or when it is
    /// a redirect without a `Location` header. Relative locations are resolved
    /// against the URL that produced them.
    ///
    /// # Errors
    ///
    /// Returns the transport's error for a failed hop,
    /// [`FetchError::TooManyRedirects`] once `max_redirects` requests were made
    /// and the last one still redirects, and [`FetchError::InvalidRedirect`]
    /// when a `Location` cannot be resolved.
    pub async fn get(&self, start: Url) -> Result<Observation, FetchError> {
        let mut current = start;
        let mut requests = 0usize;

        loop {
            let observation = self.transport.round_trip(&current).await?;
            requests += 1;

            if !is_redirect(observation.status) {
                return Ok(observation);
            }
            let Some(location) = observation.header("location") else {
                debug!(
                    "Redirect status {} for {} but no Location header",
                    observation.status, current
                );
                return Ok(observation);
            };
            if requests >= self.max_redirects {
                return Err(FetchError::TooManyRedirects(self.max_redirects));
            }

            let next = current
                .join(location)
                .map_err(|e| FetchError::InvalidRedirect {
                    url: current.to_string(),
                    location: location.to_string(),
                    reason: e.to_string(),
                })?;
            debug!("{} {} -> {}", observation.status, current, next);
            current = next;
        }
    }
}
