use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::Connection;
use tracing::{debug, warn};

use crate::config::{LONG_DB_TIMEOUT_SECS, STORAGE_RETRY_ATTEMPTS};
use crate::error::StoreError;

/// Whether a [`Store::transaction`] call needs an exclusive writer lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxMode {
    /// Non-exclusive; multiple readers (including readers in other
    /// processes) may hold this concurrently.
    Read,
    /// Exclusive; serialized against every other writer and reader.
    Write,
}

impl TxMode {
    fn begin_statement(self) -> &'static str {
        match self {
            TxMode::Read => "BEGIN DEFERRED",
            TxMode::Write => "BEGIN IMMEDIATE",
        }
    }
}

/// A single-file embedded relational store holding the `tracing` table.
///
/// `Store` owns nothing but the file path: every operation opens its own
/// connection, so the only persistent state lives on disk. This mirrors the
/// teacher's preference for stateless, retried operations over a long-lived
/// handle.
pub struct Store {
    path: PathBuf,
}

impl Store {
    /// Opens (creating if absent) the store at `path` and ensures the schema
    /// exists.
    ///
    /// Schema creation is idempotent and runs under [`LONG_DB_TIMEOUT_SECS`]
    /// to tolerate contention from a peer invocation of the same charm
    /// already holding the write lock.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = Self { path: path.into() };
        store.ensure_schema()?;
        Ok(store)
    }

    /// Returns the path backing this store.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_schema(&self) -> Result<(), StoreError> {
        self.transaction(
            TxMode::Write,
            Duration::from_secs(LONG_DB_TIMEOUT_SECS),
            |conn| {
                conn.execute_batch(
                    "CREATE TABLE IF NOT EXISTS tracing (
                        id INTEGER PRIMARY KEY,
                        priority INTEGER NOT NULL,
                        data BLOB NOT NULL,
                        mime TEXT NOT NULL
                    );
                    CREATE INDEX IF NOT EXISTS tracing_priority_id
                    ON tracing (priority, id);",
                )?;
                debug!(path = %self.path.display(), "tracing buffer schema ensured");
                Ok(())
            },
        )
    }

    /// Runs `f` inside an atomic, commit-or-rollback transaction against a
    /// fresh connection, retrying transient lock-contention failures up to
    /// [`STORAGE_RETRY_ATTEMPTS`] times.
    ///
    /// Any error returned from `f` rolls the transaction back before being
    /// propagated (after retries are exhausted).
    pub fn transaction<T>(
        &self,
        mode: TxMode,
        timeout: Duration,
        f: impl Fn(&Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut last_err = None;
        for attempt in 1..=STORAGE_RETRY_ATTEMPTS {
            match self.try_transaction(mode, timeout, &f) {
                Ok(value) => return Ok(value),
                Err(err) => {
                    warn!(attempt, error = %err, "tracing buffer transaction failed, retrying");
                    last_err = Some(err);
                }
            }
        }
        Err(last_err.expect("loop runs STORAGE_RETRY_ATTEMPTS >= 1 times"))
    }

    fn try_transaction<T>(
        &self,
        mode: TxMode,
        timeout: Duration,
        f: &impl Fn(&Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let conn =
            Connection::open(&self.path).map_err(|source| StoreError::Open {
                path: self.path.clone(),
                source,
            })?;
        conn.busy_timeout(timeout)?;
        conn.execute_batch(mode.begin_statement())?;

        match f(&conn) {
            Ok(value) => {
                conn.execute_batch("COMMIT")?;
                Ok(value)
            }
            Err(err) => {
                // Best-effort: the connection drops either way, which aborts
                // any uncommitted transaction.
                let _ = conn.execute_batch("ROLLBACK");
                Err(err)
            }
        }
    }
}
