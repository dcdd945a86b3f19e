use crate::error::ConfigError;

/// Where buffered records are POSTed, and the trust anchor to use if that's
/// an `https://` URL.
///
/// `ca_pem` is the literal PEM bundle content, not a filesystem path — see
/// the CA-semantics open question resolved in the workspace design notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub url: String,
    pub ca_pem: Option<String>,
}

impl Destination {
    /// Validates `url` and builds a `Destination`, or `Ok(None)` if `url` is
    /// absent (meaning: no destination configured, `send` is a silent
    /// no-op).
    pub fn new(url: Option<String>, ca_pem: Option<String>) -> Result<Option<Self>, ConfigError> {
        match url {
            None => Ok(None),
            Some(url) if url.starts_with("http://") || url.starts_with("https://") => {
                Ok(Some(Self { url, ca_pem }))
            }
            Some(url) => Err(ConfigError::InvalidScheme { url }),
        }
    }

    pub fn is_https(&self) -> bool {
        self.url.starts_with("https://")
    }
}
