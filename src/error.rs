use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the [`Store`](crate::Store) transaction layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The buffer file could not be opened at all (missing directory,
    /// permissions, corrupt file).
    #[error("could not open tracing buffer at {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    /// A statement inside a transaction failed; the transaction was rolled
    /// back before this error was returned.
    #[error("tracing buffer transaction failed: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Errors surfaced by [`Buffer`](crate::Buffer) operations.
#[derive(Debug, Error)]
pub enum BufferError {
    /// The underlying store could not complete the operation, even after
    /// retrying transient lock contention.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// A single chunk, on its own, is larger than the configured buffer
    /// capacity and can never be made to fit by evicting other records.
    #[error(
        "chunk of {size} bytes (rounded to {rounded} bytes) exceeds the \
         buffer capacity of {capacity} bytes on its own"
    )]
    ChunkTooLarge {
        size: usize,
        rounded: u64,
        capacity: u64,
    },
}
