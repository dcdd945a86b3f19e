use std::sync::Mutex;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, warn};

use crate::destination::Destination;
use crate::tls_cache::{build_client_config, CaKey};

/// Wall-clock budget given to a single HTTP POST to the collector.
pub const EXPORT_TIMEOUT: Duration = Duration::from_secs(1);

/// Outcome of a single [`Exporter::send`] call. Never an error: network,
/// TLS, and non-2xx failures are all represented as `NotSent`, per the
/// exporter's error taxonomy — there is no caller-visible distinction
/// between "network down" and "collector said 500".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    NotSent,
}

impl SendOutcome {
    pub fn is_sent(self) -> bool {
        matches!(self, SendOutcome::Sent)
    }
}

struct CachedClient {
    key: CaKey,
    client: Client,
}

struct State {
    destination: Option<Destination>,
    https_client: Option<CachedClient>,
    plain_client: Client,
}

/// Owns the outbound HTTP path: one POST per [`send`](Exporter::send) call,
/// with a TLS client context cached per distinct CA value.
///
/// `destination` and the TLS cache are behind one mutex so that a
/// `set_destination` call from the dispatch thread cannot interleave with a
/// `send` that has already read the URL but not yet read the CA.
pub struct Exporter {
    state: Mutex<State>,
}

impl Exporter {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                destination: None,
                https_client: None,
                plain_client: Client::builder()
                    .timeout(EXPORT_TIMEOUT)
                    .build()
                    .expect("building a plain reqwest client never fails"),
            }),
        }
    }

    /// Replaces the configured destination. When the destination is
    /// `https://` with a CA that differs from whatever is cached, the cache
    /// is cleared and rebuilt lazily on the next `send`.
    pub fn set_destination(&self, destination: Option<Destination>) {
        let mut state = self.state.lock().unwrap();
        let new_key = destination
            .as_ref()
            .filter(|d| d.is_https())
            .map(|d| CaKey::from_destination(d.ca_pem.as_deref()));

        let cache_still_valid = match (&state.https_client, &new_key) {
            (Some(cached), Some(key)) => &cached.key == key,
            (None, None) => true,
            _ => false,
        };
        if !cache_still_valid {
            state.https_client = None;
        }
        state.destination = destination;
    }

    /// POSTs `payload` with `Content-Type: content_type` to the configured
    /// destination. Returns `NotSent` without touching the network if no
    /// destination is configured.
    pub fn send(&self, payload: &[u8], content_type: &str) -> SendOutcome {
        let (url, client) = {
            let mut state = self.state.lock().unwrap();
            let Some(destination) = state.destination.clone() else {
                return SendOutcome::NotSent;
            };

            if !destination.is_https() {
                let client = state.plain_client.clone();
                (destination.url, client)
            } else {
                let key = CaKey::from_destination(destination.ca_pem.as_deref());
                let needs_rebuild = !matches!(&state.https_client, Some(cached) if cached.key == key);
                if needs_rebuild {
                    match self.build_https_client(&key) {
                        Ok(client) => state.https_client = Some(CachedClient { key, client }),
                        Err(error) => {
                            warn!(%error, "failed to build TLS client context for tracing export");
                            return SendOutcome::NotSent;
                        }
                    }
                }
                let client = state
                    .https_client
                    .as_ref()
                    .expect("just inserted or already present")
                    .client
                    .clone();
                (destination.url, client)
            }
        };

        match client
            .post(&url)
            .timeout(EXPORT_TIMEOUT)
            .header(CONTENT_TYPE, content_type.to_owned())
            .body(payload.to_vec())
            .send()
        {
            Ok(response) if response.status().is_success() => {
                debug!(status = %response.status(), "tracing export succeeded");
                SendOutcome::Sent
            }
            Ok(response) => {
                debug!(status = %response.status(), "tracing export rejected by collector");
                SendOutcome::NotSent
            }
            Err(error) => {
                debug!(%error, "tracing export failed");
                SendOutcome::NotSent
            }
        }
    }

    fn build_https_client(&self, key: &CaKey) -> Result<Client, crate::error::TlsError> {
        let tls_config = build_client_config(key)?;
        let client = Client::builder()
            .use_preconfigured_tls(tls_config)
            .timeout(EXPORT_TIMEOUT)
            .build()?;
        Ok(client)
    }
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// A minimal single-shot HTTP server: accepts one connection, reads the
    /// request, and replies with `status_line`. Kept dependency-free and
    /// synchronous since the exporter under test is itself synchronous.
    fn serve_once(status_line: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 4096];
                let _ = stream.read(&mut buf);
                let _ = stream.write_all(status_line.as_bytes());
            }
        });
        format!("http://{addr}/")
    }

    #[test]
    fn no_destination_is_silent_no_op() {
        let exporter = Exporter::new();
        assert_eq!(exporter.send(b"x", "application/x-protobuf"), SendOutcome::NotSent);
    }

    #[test]
    fn success_response_is_sent() {
        let url = serve_once("HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        let exporter = Exporter::new();
        exporter.set_destination(Destination::new(Some(url), None).unwrap());
        assert_eq!(exporter.send(b"payload", "application/x-protobuf"), SendOutcome::Sent);
    }

    #[test]
    fn server_error_is_not_sent() {
        let url = serve_once("HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        let exporter = Exporter::new();
        exporter.set_destination(Destination::new(Some(url), None).unwrap());
        assert_eq!(exporter.send(b"payload", "application/x-protobuf"), SendOutcome::NotSent);
    }

    #[test]
    fn connection_refused_is_not_sent() {
        let exporter = Exporter::new();
        exporter.set_destination(Destination::new(Some("http://127.0.0.1:1".into()), None).unwrap());
        assert_eq!(exporter.send(b"payload", "application/x-protobuf"), SendOutcome::NotSent);
    }

    #[test]
    fn changing_ca_clears_the_tls_cache() {
        const CA_PEM: &str = include_str!("../tests/fixtures/ca.pem");
        let exporter = Exporter::new();

        exporter.set_destination(Destination::new(Some("https://example.invalid/".into()), None).unwrap());
        exporter.set_destination(
            Destination::new(Some("https://example.invalid/".into()), Some(CA_PEM.to_owned())).unwrap(),
        );

        let state = exporter.state.lock().unwrap();
        // Either there's no cached client yet (none built since no send()
        // happened) or, if one exists, it must match the latest CA.
        if let Some(cached) = &state.https_client {
            assert_eq!(cached.key, CaKey::Pem(CA_PEM.to_owned()));
        }
    }
}
