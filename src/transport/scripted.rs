//! Deterministic in-memory engine for unit tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use url::Url;

use crate::error_handling::FetchError;
use crate::models::Observation;

use super::RoundTrip;

pub(crate) enum Reply {
    Status(u16),
    Redirect(u16, &'static str),
    /// Redirect status with no `Location` header.
    BareRedirect(u16),
    /// Never answers.
    Hang,
}

/// Answers from a fixed URL table; anything unscripted is a refused connection.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    replies: HashMap<String, Reply>,
    calls: AtomicUsize,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(mut self, url: &str, reply: Reply) -> Self {
        self.replies.insert(url.to_string(), reply);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn response(url: &Url, status: u16, location: Option<&str>) -> Observation {
    let mut headers = BTreeMap::new();
    if let Some(location) = location {
        headers.insert("location".to_string(), vec![location.to_string()]);
    }
    Observation {
        request_url: url.to_string(),
        status,
        protocol: "HTTP/1.1".to_string(),
        headers,
        tls_info: None,
    }
}

#[async_trait]
impl RoundTrip for ScriptedTransport {
    async fn round_trip(&self, url: &Url) -> Result<Observation, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.replies.get(url.as_str()) {
            Some(Reply::Status(status)) => Ok(response(url, *status, None)),
            Some(Reply::Redirect(status, location)) => Ok(response(url, *status, Some(location))),
            Some(Reply::BareRedirect(status)) => Ok(response(url, *status, None)),
            Some(Reply::Hang) => std::future::pending().await,
            None => Err(FetchError::Connect {
                addr: format!("{}:80", url.host_str().unwrap_or_default()),
                source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
            }),
        }
    }
}
