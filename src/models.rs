//! Records produced by a scan.
//!
//! Field names are part of the output format: every [`HostResult`] is written
//! as one JSON line with exactly these snake_case keys.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One HTTP hop: a request and the response headers it produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    /// URL requested for this hop.
    pub request_url: String,
    /// HTTP status code of the response.
    pub status: u16,
    /// Negotiated protocol version, e.g. `HTTP/1.1`.
    pub protocol: String,
    /// Response headers keyed by lower-cased name, values in arrival order.
    pub headers: BTreeMap<String, Vec<String>>,
    /// TLS session details, present only for HTTPS hops.
    pub tls_info: Option<TlsInfo>,
}

impl Observation {
    /// First value of a header, looked up case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }
}

/// TLS session state captured after the handshake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlsInfo {
    /// Protocol version name, e.g. `TLS 1.3`.
    pub version: String,
    /// Negotiated cipher suite name.
    pub cipher_suite: String,
    /// ALPN protocol agreed with the server, if any.
    pub negotiated_protocol: Option<String>,
    /// Server name sent in the handshake.
    pub server_name: String,
    pub handshake_complete: bool,
    /// Certificates presented by the peer, leaf first.
    pub peer_certificates: Vec<CertificateSummary>,
}

/// Summary of one certificate in the peer's chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateSummary {
    pub subject: String,
    pub issuer: String,
    /// RFC 3339 UTC timestamp.
    pub not_before: String,
    /// RFC 3339 UTC timestamp.
    pub not_after: String,
    /// DNS names from the Subject Alternative Name extension.
    pub dns_names: Vec<String>,
}

/// Outcome of probing one host over HTTP and (optionally) HTTPS.
///
/// Built by a single worker, then handed to the collector by value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostResult {
    /// Hostname as read from the input.
    pub host: String,
    /// URL of the terminal hop of the last probe that ran.
    pub final_location: String,
    /// Set when a fetch failed.
    pub error: Option<String>,
    pub http_observations: Vec<Observation>,
    pub https_observations: Vec<Observation>,
    pub http_ok: bool,
    pub https_ok: bool,
    /// The HTTP probe already landed on an `https://` URL, so no HTTPS probe ran.
    pub https_only: bool,
}

impl HostResult {
    /// Fresh result for `host` with every flag false.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(url: &str, status: u16) -> Observation {
        let mut headers = BTreeMap::new();
        headers.insert(
            "location".to_string(),
            vec!["https://example.com/".to_string()],
        );
        headers.insert(
            "set-cookie".to_string(),
            vec!["a=1".to_string(), "b=2".to_string()],
        );
        Observation {
            request_url: url.to_string(),
            status,
            protocol: "HTTP/1.1".to_string(),
            headers,
            tls_info: None,
        }
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let obs = observation("http://example.com/", 301);
        assert_eq!(obs.header("Location"), Some("https://example.com/"));
        assert_eq!(obs.header("LOCATION"), Some("https://example.com/"));
        assert_eq!(obs.header("Set-Cookie"), Some("a=1"));
        assert_eq!(obs.header("content-type"), None);
    }

    #[test]
    fn test_host_result_field_names() {
        let mut result = HostResult::new("example.com");
        result.http_observations.push(observation("http://example.com/", 301));
        let value = serde_json::to_value(&result).expect("serialize");
        let object = value.as_object().expect("object");

        let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "error",
                "final_location",
                "host",
                "http_observations",
                "http_ok",
                "https_observations",
                "https_ok",
                "https_only",
            ]
        );
        assert!(object["error"].is_null());
        assert_eq!(
            value["http_observations"][0]["headers"]["set-cookie"],
            serde_json::json!(["a=1", "b=2"])
        );
    }

    #[test]
    fn test_new_result_has_false_flags() {
        let result = HostResult::new("plain.test");
        assert_eq!(result.host, "plain.test");
        assert!(!result.http_ok);
        assert!(!result.https_ok);
        assert!(!result.https_only);
        assert!(result.error.is_none());
        assert!(result.final_location.is_empty());
    }
}
