//! The hyper engine against local wiremock servers and a local TLS server.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use host_scan::error_handling::FetchError;
use host_scan::initialization::init_tls_config;
use host_scan::transport::{fetch, FetchSettings, HyperTransport, RoundTrip, TransportTimeouts};
use http_body_util::Empty;
use hyper::service::service_fn;
use hyper::Response;
use hyper_util::rt::{TokioExecutor, TokioIo};
use rustls::crypto::ring::default_provider;
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use rustls::{ClientConfig, RootCertStore, ServerConfig};
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transport(timeouts: TransportTimeouts) -> HyperTransport {
    let tls = init_tls_config().expect("tls config");
    HyperTransport::new(tls, timeouts, "httparchive.org")
}

fn short_timeouts() -> TransportTimeouts {
    TransportTimeouts {
        connect: Duration::from_secs(2),
        tls_handshake: Duration::from_secs(2),
        response_header: Duration::from_millis(300),
    }
}

#[tokio::test]
async fn test_plain_http_round_trip_captures_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", "httparchive.org"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-served-by", "mock")
                .set_body_string("ignored body"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let url = Url::parse(&format!("{}/", server.uri())).expect("server url");
    let observation = transport(short_timeouts())
        .round_trip(&url)
        .await
        .expect("round trip");

    assert_eq!(observation.request_url, url.as_str());
    assert_eq!(observation.status, 200);
    assert_eq!(observation.protocol, "HTTP/1.1");
    assert_eq!(observation.header("X-Served-By"), Some("mock"));
    assert!(observation.tls_info.is_none());
}

#[tokio::test]
async fn test_redirects_are_returned_not_followed() {
    let server = MockServer::start().await;
    Mock::given(path("/"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/landing"))
        .mount(&server)
        .await;

    let url = Url::parse(&format!("{}/", server.uri())).expect("server url");
    let observation = transport(short_timeouts())
        .round_trip(&url)
        .await
        .expect("round trip");
    assert_eq!(observation.status, 301);
    assert_eq!(observation.header("location"), Some("/landing"));
}

#[tokio::test]
async fn test_fetch_follows_relative_redirect_chain() {
    let server = MockServer::start().await;
    Mock::given(path("/"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/step"))
        .mount(&server)
        .await;
    Mock::given(path("/step"))
        .respond_with(ResponseTemplate::new(307).insert_header("location", "/final?x=1"))
        .mount(&server)
        .await;
    Mock::given(path("/final"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let result = fetch(
        Arc::new(transport(short_timeouts())),
        &format!("{}/", server.uri()),
        &FetchSettings::default(),
    )
    .await;

    assert!(result.error.is_none(), "{:?}", result.error);
    let statuses: Vec<u16> = result.observations.iter().map(|o| o.status).collect();
    assert_eq!(statuses, vec![302, 307, 200]);
    let last = result.terminal().expect("terminal hop");
    assert_eq!(last.request_url, format!("{}/final?x=1", server.uri()));
}

#[tokio::test]
async fn test_slow_headers_hit_response_header_timeout() {
    let server = MockServer::start().await;
    Mock::given(path("/"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let url = Url::parse(&format!("{}/", server.uri())).expect("server url");
    let err = transport(short_timeouts())
        .round_trip(&url)
        .await
        .expect_err("headers arrive too late");
    assert!(matches!(err, FetchError::ResponseHeaderTimeout { .. }), "{err}");
}

#[tokio::test]
async fn test_overall_timeout_keeps_earlier_hops() {
    let server = MockServer::start().await;
    Mock::given(path("/"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/slow"))
        .mount(&server)
        .await;
    Mock::given(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let timeouts = TransportTimeouts {
        response_header: Duration::from_secs(5),
        ..short_timeouts()
    };
    let settings = FetchSettings {
        request_timeout: Duration::from_millis(500),
        max_redirects: 10,
    };
    let result = fetch(
        Arc::new(transport(timeouts)),
        &format!("{}/", server.uri()),
        &settings,
    )
    .await;

    assert!(matches!(result.error, Some(FetchError::RequestTimeout { .. })));
    assert_eq!(result.observations.len(), 1);
    assert_eq!(result.observations[0].status, 301);
}

#[tokio::test]
async fn test_tls_against_plain_http_server_fails_handshake() {
    let server = MockServer::start().await;
    let url = Url::parse(&format!("https://{}/", server.address())).expect("https url");

    let err = transport(short_timeouts())
        .round_trip(&url)
        .await
        .expect_err("server does not speak TLS");
    assert!(
        matches!(
            err,
            FetchError::TlsHandshake { .. } | FetchError::TlsHandshakeTimeout { .. }
        ),
        "{err}"
    );
}

#[tokio::test]
async fn test_refused_connection() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let url = Url::parse(&format!("http://{addr}/")).expect("url");
    let err = transport(short_timeouts())
        .round_trip(&url)
        .await
        .expect_err("nothing listens");
    assert!(matches!(err, FetchError::Connect { .. }), "{err}");
}

/// Serves `200 OK` over TLS with a fresh self-signed certificate for
/// `localhost` and `127.0.0.1`. The server offers only `alpn`; HTTP/2 is
/// spoken when `h2` is negotiated.
async fn start_tls_server(alpn: &[&[u8]]) -> (SocketAddr, CertificateDer<'static>) {
    let names = vec!["localhost".to_string(), "127.0.0.1".to_string()];
    let generated = rcgen::generate_simple_self_signed(names).expect("generate certificate");
    let cert = generated.cert.der().clone();
    let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(generated.key_pair.serialize_der()));

    let mut config = ServerConfig::builder_with_provider(Arc::new(default_provider()))
        .with_safe_default_protocol_versions()
        .expect("protocol versions")
        .with_no_client_auth()
        .with_single_cert(vec![cert.clone()], key)
        .expect("server certificate");
    config.alpn_protocols = alpn.iter().map(|p| p.to_vec()).collect();
    let acceptor = TlsAcceptor::from(Arc::new(config));

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let acceptor = acceptor.clone();
            tokio::spawn(async move {
                let Ok(tls) = acceptor.accept(stream).await else {
                    return;
                };
                let h2 = tls.get_ref().1.alpn_protocol() == Some(&b"h2"[..]);
                let service = service_fn(|_request| async {
                    let response = Response::builder()
                        .header("x-served-by", "tls-mock")
                        .body(Empty::<Bytes>::new())
                        .expect("response");
                    Ok::<_, Infallible>(response)
                });
                let io = TokioIo::new(tls);
                let _ = if h2 {
                    hyper::server::conn::http2::Builder::new(TokioExecutor::new())
                        .serve_connection(io, service)
                        .await
                } else {
                    hyper::server::conn::http1::Builder::new()
                        .serve_connection(io, service)
                        .await
                };
            });
        }
    });
    (addr, cert)
}

/// Client config trusting only `cert`, offering `h2` then `http/1.1`.
fn trusting(cert: CertificateDer<'static>) -> Arc<ClientConfig> {
    let mut roots = RootCertStore::empty();
    roots.add(cert).expect("trust anchor");
    let mut config = ClientConfig::builder_with_provider(Arc::new(default_provider()))
        .with_safe_default_protocol_versions()
        .expect("protocol versions")
        .with_root_certificates(roots)
        .with_no_client_auth();
    config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];
    Arc::new(config)
}

#[tokio::test]
async fn test_https_round_trip_over_http1_captures_tls_info() {
    let (addr, cert) = start_tls_server(&[b"http/1.1"]).await;
    let transport = HyperTransport::new(trusting(cert), short_timeouts(), "httparchive.org");

    let url = Url::parse(&format!("https://127.0.0.1:{}/", addr.port())).expect("url");
    let observation = transport.round_trip(&url).await.expect("round trip");

    assert_eq!(observation.status, 200);
    assert_eq!(observation.protocol, "HTTP/1.1");
    assert_eq!(observation.header("x-served-by"), Some("tls-mock"));

    let tls = observation.tls_info.expect("https hop carries tls info");
    assert_eq!(tls.version, "TLS 1.3");
    assert_ne!(tls.cipher_suite, "unknown");
    assert!(tls.cipher_suite.starts_with("TLS13_"), "{}", tls.cipher_suite);
    assert_eq!(tls.negotiated_protocol.as_deref(), Some("http/1.1"));
    assert_eq!(tls.server_name, "127.0.0.1");
    assert!(tls.handshake_complete);
    assert_eq!(tls.peer_certificates.len(), 1);
    assert_eq!(tls.peer_certificates[0].dns_names, vec!["localhost"]);
}

#[tokio::test]
async fn test_https_round_trip_negotiates_http2() {
    let (addr, cert) = start_tls_server(&[b"h2", b"http/1.1"]).await;
    let transport = HyperTransport::new(trusting(cert), short_timeouts(), "httparchive.org");

    let url = Url::parse(&format!("https://127.0.0.1:{}/", addr.port())).expect("url");
    let observation = transport.round_trip(&url).await.expect("round trip");

    assert_eq!(observation.status, 200);
    assert_eq!(observation.protocol, "HTTP/2.0");
    assert_eq!(observation.header("x-served-by"), Some("tls-mock"));
    let tls = observation.tls_info.expect("https hop carries tls info");
    assert_eq!(tls.version, "TLS 1.3");
    assert_eq!(tls.negotiated_protocol.as_deref(), Some("h2"));
    assert_eq!(tls.peer_certificates[0].dns_names, vec!["localhost"]);
}

#[tokio::test]
async fn test_untrusted_certificate_fails_handshake() {
    let (addr, _cert) = start_tls_server(&[b"http/1.1"]).await;
    let url = Url::parse(&format!("https://127.0.0.1:{}/", addr.port())).expect("url");

    let err = transport(short_timeouts())
        .round_trip(&url)
        .await
        .expect_err("self-signed certificate is not in the web roots");
    assert!(matches!(err, FetchError::TlsHandshake { .. }), "{err}");
}
