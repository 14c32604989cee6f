//! Probe transport.
//!
//! The transport is layered:
//! - [`RoundTrip`] is the capability every engine provides: one request, one
//!   [`Observation`], no redirect handling.
//! - [`HyperTransport`] is the network engine (hyper over TCP / rustls).
//! - [`RecordingTransport`] decorates any engine and keeps every hop it sees.
//! - [`RedirectClient`] follows redirects on top of a `RoundTrip`.
//! - [`fetch`] ties them together for one URL under an overall deadline.

mod engine;
mod fetch;
mod recording;
mod redirects;
#[cfg(test)]
pub(crate) mod scripted;
mod tls;

use async_trait::async_trait;
use url::Url;

use crate::error_handling::FetchError;
use crate::models::Observation;

pub use engine::{HyperTransport, TransportTimeouts};
pub use fetch::{fetch, Fetch, FetchSettings};
pub use recording::RecordingTransport;
pub use redirects::{is_redirect, RedirectClient};
pub use tls::tls_version_name;

/// Performs a single HTTP round trip.
///
/// Implementations must not follow redirects: a 3xx response is returned as
/// an ordinary [`Observation`] and the caller decides what to do with it.
#[async_trait]
pub trait RoundTrip: Send + Sync {
    /// Issues a GET for `url` and describes the response.
    async fn round_trip(&self, url: &Url) -> Result<Observation, FetchError>;
}
