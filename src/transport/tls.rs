//! TLS session details.
//!
//! Turns a completed rustls client session into a [`TlsInfo`]: protocol
//! version and cipher suite names, ALPN result, and a summary of each
//! certificate the peer presented (parsed with `x509-parser`).

use chrono::{DateTime, Utc};
use log::debug;
use rustls::{ClientConnection, ProtocolVersion};
use x509_parser::certificate::X509Certificate;
use x509_parser::extensions::{GeneralName, ParsedExtension};

use crate::models::{CertificateSummary, TlsInfo};

/// Human-readable protocol version name.
pub fn tls_version_name(version: ProtocolVersion) -> &'static str {
    match version {
        ProtocolVersion::SSLv3 => "SSL 3.0",
        ProtocolVersion::TLSv1_0 => "TLS 1.0",
        ProtocolVersion::TLSv1_1 => "TLS 1.1",
        ProtocolVersion::TLSv1_2 => "TLS 1.2",
        ProtocolVersion::TLSv1_3 => "TLS 1.3",
        _ => "unknown",
    }
}

pub(crate) fn describe_session(session: &ClientConnection, server_name: &str) -> TlsInfo {
    let version = session
        .protocol_version()
        .map(tls_version_name)
        .unwrap_or("unknown")
        .to_string();

    let cipher_suite = session
        .negotiated_cipher_suite()
        .map(|cs| format!("{:?}", cs.suite()))
        .unwrap_or_else(|| "unknown".to_string());

    let negotiated_protocol = session
        .alpn_protocol()
        .map(|proto| String::from_utf8_lossy(proto).into_owned());

    let peer_certificates = session
        .peer_certificates()
        .map(|certs| {
            certs
                .iter()
                .filter_map(|der| summarize_certificate(der.as_ref()))
                .collect()
        })
        .unwrap_or_default();

    TlsInfo {
        version,
        cipher_suite,
        negotiated_protocol,
        server_name: server_name.to_string(),
        handshake_complete: !session.is_handshaking(),
        peer_certificates,
    }
}

/// Parses one DER certificate; unparseable certificates are skipped.
pub(crate) fn summarize_certificate(der: &[u8]) -> Option<CertificateSummary> {
    let cert = match x509_parser::parse_x509_certificate(der) {
        Ok((_, cert)) => cert,
        Err(e) => {
            debug!("Skipping unparseable peer certificate: {e}");
            return None;
        }
    };

    let validity = cert.validity();
    Some(CertificateSummary {
        subject: cert.subject().to_string(),
        issuer: cert.issuer().to_string(),
        not_before: format_timestamp(validity.not_before.timestamp()),
        not_after: format_timestamp(validity.not_after.timestamp()),
        dns_names: extract_dns_names(&cert),
    })
}

/// DNS names from the Subject Alternative Name extension.
fn extract_dns_names(cert: &X509Certificate<'_>) -> Vec<String> {
    let mut names = Vec::new();
    for ext in cert.extensions() {
        if let ParsedExtension::SubjectAlternativeName(san) = ext.parsed_extension() {
            for general_name in &san.general_names {
                if let GeneralName::DNSName(dns_name) = general_name {
                    names.push(dns_name.to_string());
                }
            }
        }
    }
    names
}

fn format_timestamp(epoch_seconds: i64) -> String {
    DateTime::<Utc>::from_timestamp(epoch_seconds, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default()
}
