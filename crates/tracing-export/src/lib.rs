//! HTTP(S) export of buffered tracing payloads to a single configurable
//! collector endpoint.
//!
//! ```
//! use tracing_export::{Destination, Exporter};
//!
//! let exporter = Exporter::new();
//! exporter.set_destination(Destination::new(None, None).unwrap());
//! assert!(!exporter.send(b"{}", "application/json").is_sent());
//! ```

mod destination;
mod error;
mod exporter;
mod tls_cache;

pub use destination::Destination;
pub use error::ConfigError;
pub use exporter::{Exporter, SendOutcome, EXPORT_TIMEOUT};
