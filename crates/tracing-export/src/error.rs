use thiserror::Error;

/// Raised synchronously when a destination is configured with an
/// unsupported URL scheme. Network, TLS, and timeout failures are not
/// represented here — the exporter swallows those into
/// [`SendOutcome::NotSent`](crate::SendOutcome::NotSent), per the error
/// taxonomy.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("destination url {url:?} must start with http:// or https://")]
    InvalidScheme { url: String },
}

#[derive(Debug, Error)]
pub(crate) enum TlsError {
    #[error("failed to parse CA PEM bundle: {0}")]
    Pem(#[from] std::io::Error),
    #[error("failed to load native root certificates: {0}")]
    NativeCerts(std::io::Error),
    #[error("rustls rejected the root certificate: {0}")]
    Rustls(#[from] rustls::Error),
    #[error("failed to build HTTP client: {0}")]
    Reqwest(#[from] reqwest::Error),
}
