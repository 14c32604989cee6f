//! TLS client configuration.

use std::sync::Arc;

use rustls::crypto::ring::default_provider;
use rustls::{ClientConfig, RootCertStore};

use crate::config::ALPN_PROTOCOLS;
use crate::error_handling::InitializationError;

/// Builds the rustls configuration used for every HTTPS probe.
///
/// Certificates are verified against the Mozilla root set from
/// `webpki-roots`; ALPN offers `h2` then `http/1.1`. The ring provider is
/// passed explicitly, so no process-wide default provider is required.
pub fn init_tls_config() -> Result<Arc<ClientConfig>, InitializationError> {
    let mut roots = RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let mut config = ClientConfig::builder_with_provider(Arc::new(default_provider()))
        .with_safe_default_protocol_versions()?
        .with_root_certificates(roots)
        .with_no_client_auth();
    config.alpn_protocols = ALPN_PROTOCOLS.iter().map(|p| p.to_vec()).collect();

    Ok(Arc::new(config))
}
