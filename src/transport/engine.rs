//! Network engine: one request per fresh connection.
//!
//! Opens a TCP connection, optionally runs a rustls handshake, speaks HTTP/1.1
//! or HTTP/2 (chosen by ALPN) through hyper's connection-level client, and
//! tears the connection down as soon as the response headers are in. Each
//! phase has its own timeout.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::header::{CONNECTION, HOST, USER_AGENT};
use http::{HeaderMap, Method, Request, Response, Version};
use http_body_util::Empty;
use hyper::body::Incoming;
use hyper_util::rt::{TokioExecutor, TokioIo};
use log::debug;
use rustls::pki_types::ServerName;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::TlsConnector;
use url::{Host, Position, Url};

use crate::config::{
    Config, RESPONSE_HEADER_TIMEOUT_SECS, TCP_CONNECT_TIMEOUT_SECS, TLS_HANDSHAKE_TIMEOUT_SECS,
};
use crate::error_handling::FetchError;
use crate::models::{Observation, TlsInfo};

use super::tls::describe_session;
use super::RoundTrip;

/// Per-phase timeouts applied to every round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportTimeouts {
    /// DNS resolution plus TCP connect.
    pub connect: Duration,
    pub tls_handshake: Duration,
    /// From sending the request until the response headers are parsed.
    pub response_header: Duration,
}

impl Default for TransportTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(TCP_CONNECT_TIMEOUT_SECS),
            tls_handshake: Duration::from_secs(TLS_HANDSHAKE_TIMEOUT_SECS),
            response_header: Duration::from_secs(RESPONSE_HEADER_TIMEOUT_SECS),
        }
    }
}

impl From<&Config> for TransportTimeouts {
    fn from(config: &Config) -> Self {
        Self {
            connect: config.connect_timeout(),
            tls_handshake: config.tls_handshake_timeout(),
            response_header: config.response_header_timeout(),
        }
    }
}

/// The production [`RoundTrip`] engine.
///
/// Connections are never reused: every round trip dials, sends
/// `Connection: close` on HTTP/1.1 and drops the connection after reading the
/// headers, so nothing accumulates across millions of one-shot probes.
pub struct HyperTransport {
    connector: TlsConnector,
    timeouts: TransportTimeouts,
    user_agent: String,
}

impl HyperTransport {
    pub fn new(
        tls_config: Arc<rustls::ClientConfig>,
        timeouts: TransportTimeouts,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            connector: TlsConnector::from(tls_config),
            timeouts,
            user_agent: user_agent.into(),
        }
    }

    async fn connect(&self, url: &Url) -> Result<TcpStream, FetchError> {
        let host = connect_host(url)?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| FetchError::InvalidUrl {
                url: url.to_string(),
                reason: "no port for scheme".to_string(),
            })?;
        let addr = format!("{host}:{port}");

        match timeout(
            self.timeouts.connect,
            TcpStream::connect((host.as_str(), port)),
        )
        .await
        {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(source)) => Err(FetchError::Connect { addr, source }),
            Err(_) => Err(FetchError::ConnectTimeout {
                addr,
                timeout: self.timeouts.connect,
            }),
        }
    }

    async fn send_http1<S>(
        &self,
        io: TokioIo<S>,
        url: &Url,
    ) -> Result<Response<Incoming>, FetchError>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let (mut sender, connection) =
            hyper::client::conn::http1::handshake::<_, Empty<Bytes>>(io).await?;
        let driver = tokio::spawn(async move {
            if let Err(e) = connection.await {
                debug!("HTTP/1 connection ended with error: {e}");
            }
        });

        let request = Request::builder()
            .method(Method::GET)
            .uri(&url[Position::BeforePath..Position::AfterQuery])
            .header(HOST, &url[Position::BeforeHost..Position::AfterPort])
            .header(USER_AGENT, self.user_agent.as_str())
            .header(CONNECTION, "close")
            .body(Empty::<Bytes>::new())?;

        let response = self.await_headers(sender.send_request(request), url).await;
        // The body is never read; dropping the driver closes the connection.
        driver.abort();
        response
    }

    async fn send_http2<S>(
        &self,
        io: TokioIo<S>,
        url: &Url,
    ) -> Result<Response<Incoming>, FetchError>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let (mut sender, connection) =
            hyper::client::conn::http2::handshake::<_, _, Empty<Bytes>>(TokioExecutor::new(), io)
                .await?;
        let driver = tokio::spawn(async move {
            if let Err(e) = connection.await {
                debug!("HTTP/2 connection ended with error: {e}");
            }
        });

        let request = Request::builder()
            .method(Method::GET)
            .uri(&url[..Position::AfterQuery])
            .header(USER_AGENT, self.user_agent.as_str())
            .body(Empty::<Bytes>::new())?;

        let response = self.await_headers(sender.send_request(request), url).await;
        driver.abort();
        response
    }

    async fn await_headers<F>(&self, pending: F, url: &Url) -> Result<Response<Incoming>, FetchError>
    where
        F: Future<Output = hyper::Result<Response<Incoming>>>,
    {
        match timeout(self.timeouts.response_header, pending).await {
            Ok(response) => Ok(response?),
            Err(_) => Err(FetchError::ResponseHeaderTimeout {
                url: url.to_string(),
                timeout: self.timeouts.response_header,
            }),
        }
    }

    async fn round_trip_tls(&self, url: &Url) -> Result<Observation, FetchError> {
        let host = connect_host(url)?;
        let server_name = ServerName::try_from(host.clone())
            .map_err(|_| FetchError::InvalidServerName(host.clone()))?;
        let stream = self.connect(url).await?;

        let tls_stream = match timeout(
            self.timeouts.tls_handshake,
            self.connector.connect(server_name, stream),
        )
        .await
        {
            Ok(Ok(tls_stream)) => tls_stream,
            Ok(Err(source)) => return Err(FetchError::TlsHandshake { host, source }),
            Err(_) => {
                return Err(FetchError::TlsHandshakeTimeout {
                    host,
                    timeout: self.timeouts.tls_handshake,
                })
            }
        };

        let (_, session) = tls_stream.get_ref();
        let tls_info = describe_session(session, &host);
        let use_http2 = session.alpn_protocol() == Some(&b"h2"[..]);

        let response = if use_http2 {
            self.send_http2(TokioIo::new(tls_stream), url).await?
        } else {
            self.send_http1(TokioIo::new(tls_stream), url).await?
        };
        Ok(observe(url, &response, Some(tls_info)))
    }
}

#[async_trait]
impl RoundTrip for HyperTransport {
    async fn round_trip(&self, url: &Url) -> Result<Observation, FetchError> {
        match url.scheme() {
            "http" => {
                let stream = self.connect(url).await?;
                let response = self.send_http1(TokioIo::new(stream), url).await?;
                Ok(observe(url, &response, None))
            }
            "https" => self.round_trip_tls(url).await,
            other => Err(FetchError::UnsupportedScheme(other.to_string())),
        }
    }
}

/// Host to dial: domain names as-is, IP literals without brackets.
fn connect_host(url: &Url) -> Result<String, FetchError> {
    match url.host() {
        Some(Host::Domain(domain)) => Ok(domain.to_string()),
        Some(Host::Ipv4(addr)) => Ok(addr.to_string()),
        Some(Host::Ipv6(addr)) => Ok(addr.to_string()),
        None => Err(FetchError::InvalidUrl {
            url: url.to_string(),
            reason: "missing host".to_string(),
        }),
    }
}

fn observe<B>(url: &Url, response: &Response<B>, tls_info: Option<TlsInfo>) -> Observation {
    Observation {
        request_url: url.to_string(),
        status: response.status().as_u16(),
        protocol: protocol_name(response.version()).to_string(),
        headers: collect_headers(response.headers()),
        tls_info,
    }
}

pub(crate) fn protocol_name(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "HTTP/0.9",
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_11 => "HTTP/1.1",
        Version::HTTP_2 => "HTTP/2.0",
        Version::HTTP_3 => "HTTP/3.0",
        _ => "UNKNOWN",
    }
}

pub(crate) fn collect_headers(map: &HeaderMap) -> BTreeMap<String, Vec<String>> {
    let mut headers: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in map {
        headers
            .entry(name.as_str().to_string())
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    headers
}
