//! `tracing-store` — the durable, priority-ordered, size-bounded record store
//! behind a buffered tracing-export pipeline.
//!
//! This crate is the algorithmic core described in the workspace: a single
//! on-disk file holding a FIFO-within-priority queue of opaque tracing
//! payloads, with a two-level priority scheme (`DEFAULT` / `OBSERVED`) and a
//! size-aware eviction policy. It knows nothing about HTTP, TLS, or the
//! tracing SDK — those live in the peripheral crates (`tracing-export`,
//! `tracing-pipeline`, `tracing-lifecycle`) that depend on it.
//!
//! # Example
//!
//! ```
//! use tracing_store::{Buffer, Config};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let buffer = Buffer::open(dir.path().join(".tracing-data.db"), Config::default()).unwrap();
//!
//! let head = buffer.pump(Some((b"span-batch-bytes", "application/x-protobuf"))).unwrap();
//! let head = head.expect("a record was just inserted");
//! buffer.remove(head.id).unwrap();
//! ```

mod buffer;
pub mod config;
mod error;
mod record;
mod store;

pub use buffer::Buffer;
pub use config::Config;
pub use error::{BufferError, StoreError};
pub use record::Record;
pub use store::{Store, TxMode};
