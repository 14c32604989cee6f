// Shared test helpers: a deterministic in-memory transport and output parsing.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use host_scan::error_handling::FetchError;
use host_scan::transport::RoundTrip;
use host_scan::{HostResult, Observation};

/// How the mock answers one URL.
#[allow(dead_code)] // Not every test file uses every reply
pub enum Reply {
    Status(u16),
    Redirect(u16, &'static str),
    Hang,
}

/// Answers from a fixed URL table. Unknown URLs fail like a refused connection.
#[derive(Default)]
pub struct MockTransport {
    replies: HashMap<String, Reply>,
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, reply: Reply) -> Self {
        self.replies.insert(url.to_string(), reply);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl RoundTrip for MockTransport {
    async fn round_trip(&self, url: &Url) -> Result<Observation, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let (status, location) = match self.replies.get(url.as_str()) {
            Some(Reply::Status(status)) => (*status, None),
            Some(Reply::Redirect(status, location)) => (*status, Some(*location)),
            Some(Reply::Hang) => return std::future::pending().await,
            None => {
                return Err(FetchError::Connect {
                    addr: format!("{}:80", url.host_str().unwrap_or_default()),
                    source: std::io::Error::new(
                        std::io::ErrorKind::ConnectionRefused,
                        "connection refused",
                    ),
                })
            }
        };

        let mut headers = BTreeMap::new();
        headers.insert("server".to_string(), vec!["mock".to_string()]);
        if let Some(location) = location {
            headers.insert("location".to_string(), vec![location.to_string()]);
        }
        Ok(Observation {
            request_url: url.to_string(),
            status,
            protocol: "HTTP/1.1".to_string(),
            headers,
            tls_info: None,
        })
    }
}

/// Parses JSON Lines output into records.
#[allow(dead_code)]
pub fn parse_records(output: &[u8]) -> Vec<HostResult> {
    String::from_utf8(output.to_vec())
        .expect("output is UTF-8")
        .lines()
        .map(|line| serde_json::from_str(line).expect("each line is one record"))
        .collect()
}

/// Records keyed by host.
#[allow(dead_code)]
pub fn by_host(records: Vec<HostResult>) -> BTreeMap<String, HostResult> {
    records
        .into_iter()
        .map(|record| (record.host.clone(), record))
        .collect()
}
