use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Mutex;

use rusqlite::Connection;
use tracing::debug;

use crate::config::{slots_for, Config, DEFAULT_PRIORITY, OBSERVED_PRIORITY};
use crate::error::{BufferError, StoreError};
use crate::record::Record;
use crate::store::{Store, TxMode};

/// Priority/size discipline layered over the [`Store`].
///
/// `Buffer` is the algorithmic heart of the crate: it owns the in-memory
/// session state (`pending_ids`, `observed`) described in the data model and
/// translates the four buffer operations into single-transaction SQL
/// statements against the store.
///
/// Session state is protected by a mutex because `pump`/`remove` are called
/// from the background export worker while `mark_observed` is called from
/// the main dispatch thread, possibly concurrently.
pub struct Buffer {
    store: Store,
    config: Config,
    state: Mutex<SessionState>,
}

#[derive(Debug, Default)]
struct SessionState {
    pending_ids: HashSet<i64>,
    observed: bool,
}

impl Buffer {
    /// Opens the buffer file at `path`, creating the schema if absent.
    pub fn open(path: impl Into<PathBuf>, config: Config) -> Result<Self, BufferError> {
        let store = Store::open(path)?;
        Ok(Self {
            store,
            config,
            state: Mutex::new(SessionState::default()),
        })
    }

    /// Inserts `chunk` (if provided) and returns the current head record:
    /// the highest-priority record, ties broken by lowest id.
    ///
    /// Both the insertion and the head read happen in one transaction.
    pub fn pump(&self, chunk: Option<(&[u8], &str)>) -> Result<Option<Record>, BufferError> {
        if let Some((payload, _)) = chunk {
            let rounded = slots_for(payload.len() as u64);
            if rounded > self.config.buffer_size {
                return Err(BufferError::ChunkTooLarge {
                    size: payload.len(),
                    rounded,
                    capacity: self.config.buffer_size,
                });
            }
        }

        let mut state = self.state.lock().unwrap();
        let observed = state.observed;
        let buffer_size = self.config.buffer_size;

        let (head, inserted_id) = self.store.transaction(
            TxMode::Write,
            self.config.db_timeout,
            |conn| pump_tx(conn, chunk, observed, buffer_size),
        )?;

        if let (Some(id), false) = (inserted_id, observed) {
            state.pending_ids.insert(id);
        }

        Ok(head)
    }

    /// Idempotently promotes every record inserted by this process during
    /// this dispatch (tracked in `pending_ids`) to `OBSERVED_PRIORITY`, then
    /// marks the session as observed so future inserts are born observed.
    pub fn mark_observed(&self) -> Result<(), BufferError> {
        let mut state = self.state.lock().unwrap();
        if state.observed {
            return Ok(());
        }

        let ids: Vec<i64> = state.pending_ids.iter().copied().collect();
        self.store.transaction(
            TxMode::Write,
            self.config.long_db_timeout,
            |conn| mark_observed_tx(conn, &ids),
        )?;

        state.observed = true;
        state.pending_ids.clear();
        debug!("tracing buffer marked observed");
        Ok(())
    }

    /// Deletes the record with the given id. Missing rows are not an error.
    pub fn remove(&self, id: i64) -> Result<(), BufferError> {
        self.store
            .transaction(TxMode::Write, self.config.db_timeout, |conn| {
                conn.execute("DELETE FROM tracing WHERE id = ?1", [id])?;
                Ok(())
            })?;

        let mut state = self.state.lock().unwrap();
        state.pending_ids.remove(&id);
        Ok(())
    }

    /// Returns whether this session has observed an event (for tests and
    /// diagnostics).
    pub fn is_observed(&self) -> bool {
        self.state.lock().unwrap().observed
    }
}

fn pump_tx(
    conn: &Connection,
    chunk: Option<(&[u8], &str)>,
    observed: bool,
    buffer_size: u64,
) -> Result<(Option<Record>, Option<i64>), StoreError> {
    let mut inserted_id = None;

    if let Some((payload, content_type)) = chunk {
        let chunk_slots = slots_for(payload.len() as u64) as i64;
        let stored: i64 = conn.query_row(
            "SELECT COALESCE(SUM((LENGTH(data) + 4095) / 4096 * 4096), 0) FROM tracing",
            [],
            |row| row.get(0),
        )?;

        let excess = stored + chunk_slots - buffer_size as i64;
        if excess > 0 {
            evict(conn, excess)?;
        }

        let priority = if observed {
            OBSERVED_PRIORITY
        } else {
            DEFAULT_PRIORITY
        };
        conn.execute(
            "INSERT INTO tracing (priority, data, mime) VALUES (?1, ?2, ?3)",
            rusqlite::params![priority, payload, content_type],
        )?;
        inserted_id = Some(conn.last_insert_rowid());
    }

    let head = conn
        .query_row(
            "SELECT id, priority, data, mime FROM tracing
             ORDER BY priority DESC, id ASC
             LIMIT 1",
            [],
            |row| {
                Ok(Record {
                    id: row.get(0)?,
                    priority: row.get(1)?,
                    payload: row.get(2)?,
                    content_type: row.get(3)?,
                })
            },
        )
        .ok();

    Ok((head, inserted_id))
}

/// Deletes the smallest prefix (ordered by priority ASC, id ASC) whose
/// cumulative slot count is enough to bring `excess` back to zero or below.
fn evict(conn: &Connection, excess: i64) -> Result<(), StoreError> {
    let mut collected_ids = Vec::new();
    let mut collected_size: i64 = 0;

    {
        let mut stmt = conn.prepare(
            "SELECT id, (LENGTH(data) + 4095) / 4096 * 4096 FROM tracing
             ORDER BY priority ASC, id ASC",
        )?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let id: i64 = row.get(0)?;
            let size: i64 = row.get(1)?;
            collected_ids.push(id);
            collected_size += size;
            if collected_size >= excess {
                break;
            }
        }
    }

    debug!(count = collected_ids.len(), excess, "evicting records to make room");

    let placeholders = collected_ids
        .iter()
        .map(|_| "?")
        .collect::<Vec<_>>()
        .join(",");
    let sql = format!("DELETE FROM tracing WHERE id IN ({placeholders})");
    let params = rusqlite::params_from_iter(collected_ids.iter());
    conn.execute(&sql, params)?;
    Ok(())
}

fn mark_observed_tx(conn: &Connection, ids: &[i64]) -> Result<(), StoreError> {
    if ids.is_empty() {
        return Ok(());
    }
    let placeholders = ids.iter().map(|_| "?").collect::<Vec<_>>().join(",");
    let sql = format!(
        "UPDATE tracing SET priority = {OBSERVED_PRIORITY} WHERE id IN ({placeholders})"
    );
    let params = rusqlite::params_from_iter(ids.iter());
    conn.execute(&sql, params)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(dir: &tempfile::TempDir) -> Buffer {
        Buffer::open(dir.path().join("buffer.db"), Config::default()).unwrap()
    }

    #[test]
    fn empty_buffer_drain_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let buf = buffer(&dir);

        let head = buf.pump(Some((b"A", "application/x-protobuf"))).unwrap();
        let head = head.unwrap();
        assert_eq!(head.id, 1);
        assert_eq!(head.priority, DEFAULT_PRIORITY);
        assert_eq!(head.payload, b"A");

        buf.mark_observed().unwrap();

        let head = buf.pump(Some((b"B", "application/x-protobuf"))).unwrap();
        let head = head.unwrap();
        // id=1 was promoted to OBSERVED; id=2 is born OBSERVED too, tie
        // broken by lowest id.
        assert_eq!(head.id, 1);
        assert_eq!(head.priority, OBSERVED_PRIORITY);
    }

    #[test]
    fn eviction_under_quota() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new(8192, std::time::Duration::from_secs(5), std::time::Duration::from_secs(3600));
        let buf = Buffer::open(dir.path().join("buffer.db"), config).unwrap();

        let p1 = vec![1u8; 4000];
        let p2 = vec![2u8; 4000];
        let p3 = vec![3u8; 4000];

        buf.pump(Some((&p1, "m"))).unwrap();
        buf.pump(Some((&p2, "m"))).unwrap();
        let head = buf.pump(Some((&p3, "m"))).unwrap().unwrap();

        // P1 (lowest priority tie, lowest id) was evicted to make room for P3.
        assert_eq!(head.payload, p2);
    }

    #[test]
    fn priority_preservation_and_oversized_insert_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new(8192, std::time::Duration::from_secs(5), std::time::Duration::from_secs(3600));
        let buf = Buffer::open(dir.path().join("buffer.db"), config).unwrap();

        let p1 = vec![1u8; 4000];
        buf.pump(Some((&p1, "m"))).unwrap();
        buf.mark_observed().unwrap();

        let p2 = vec![2u8; 4000];
        buf.pump(Some((&p2, "m"))).unwrap();

        // Both P1 and P2 are now OBSERVED; a third oversized chunk alone
        // would need to evict both just to make space for itself, but a
        // single chunk larger than the whole buffer is rejected outright.
        let p3 = vec![3u8; 8193];
        let result = buf.pump(Some((&p3, "m")));
        assert!(matches!(result, Err(BufferError::ChunkTooLarge { .. })));
    }

    #[test]
    fn mark_observed_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let buf = buffer(&dir);
        buf.pump(Some((b"A", "m"))).unwrap();
        buf.mark_observed().unwrap();
        buf.mark_observed().unwrap();
        assert!(buf.is_observed());
    }

    #[test]
    fn remove_is_idempotent_over_missing_ids() {
        let dir = tempfile::tempdir().unwrap();
        let buf = buffer(&dir);
        buf.remove(999).unwrap();
        buf.remove(999).unwrap();
    }

    #[test]
    fn restart_round_trip_preserves_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("buffer.db");

        {
            let buf = Buffer::open(&path, Config::default()).unwrap();
            buf.pump(Some((b"A", "m"))).unwrap();
            buf.pump(Some((b"B", "m"))).unwrap();
            buf.mark_observed().unwrap();
        }

        // Fresh process: new Buffer, fresh session state, same file.
        let buf = Buffer::open(&path, Config::default()).unwrap();
        assert!(!buf.is_observed());
        let head = buf.pump(None).unwrap().unwrap();
        assert_eq!(head.id, 1);
        assert_eq!(head.priority, OBSERVED_PRIORITY);
    }
}
