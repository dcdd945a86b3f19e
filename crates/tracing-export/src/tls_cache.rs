use std::sync::Once;

use rustls::{ClientConfig, RootCertStore};

use crate::error::TlsError;

static INSTALL_CRYPTO_PROVIDER: Once = Once::new();

fn ensure_crypto_provider() {
    INSTALL_CRYPTO_PROVIDER.call_once(|| {
        // Ignore the error: if another part of the process already installed
        // a provider (or this races another ensure_crypto_provider caller),
        // that's fine — we only need *a* default provider to exist.
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// Key under which a built TLS client context is cached: the exact CA
/// bundle, or the sentinel "no CA" (native roots). At most one entry is
/// retained at any time (see `Exporter`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum CaKey {
    None,
    Pem(String),
}

impl CaKey {
    pub(crate) fn from_destination(ca_pem: Option<&str>) -> Self {
        match ca_pem {
            Some(pem) => CaKey::Pem(pem.to_owned()),
            None => CaKey::None,
        }
    }
}

/// Builds a `rustls::ClientConfig` restricted to ALPN `http/1.1`, trusting
/// either the supplied PEM bundle or the platform's native roots.
pub(crate) fn build_client_config(key: &CaKey) -> Result<ClientConfig, TlsError> {
    ensure_crypto_provider();

    let mut roots = RootCertStore::empty();
    match key {
        CaKey::Pem(pem) => {
            let mut reader = std::io::Cursor::new(pem.as_bytes());
            for cert in rustls_pemfile::certs(&mut reader) {
                let cert = cert?;
                roots.add(cert)?;
            }
        }
        CaKey::None => {
            let native = rustls_native_certs::load_native_certs()
                .map_err(TlsError::NativeCerts)?;
            for cert in native {
                // A single unparsable native cert shouldn't make the whole
                // store unusable; skip and move on.
                let _ = roots.add(cert);
            }
        }
    }

    let mut config = ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth();
    config.alpn_protocols = vec![b"http/1.1".to_vec()];
    Ok(config)
}
