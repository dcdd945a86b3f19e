use std::time::Duration;

/// Configuration for the [`Store`](crate::Store) and [`Buffer`](crate::Buffer).
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// Soft cap on total payload bytes retained, rounded up per-record to 4 KiB
    /// slots before comparison (default: 40 MiB).
    pub buffer_size: u64,
    /// Lock-acquisition timeout used by ordinary transactions.
    pub db_timeout: Duration,
    /// Lock-acquisition timeout used by schema initialization and
    /// `mark_observed`, which must tolerate contention from peer invocations
    /// of the same charm.
    pub long_db_timeout: Duration,
}

impl Config {
    /// Creates a new configuration with custom settings.
    ///
    /// # Panics
    ///
    /// Panics if `buffer_size` is zero, or if `long_db_timeout` is shorter
    /// than `db_timeout`.
    pub fn new(buffer_size: u64, db_timeout: Duration, long_db_timeout: Duration) -> Self {
        assert!(buffer_size > 0, "buffer_size must be non-zero");
        assert!(
            long_db_timeout >= db_timeout,
            "long_db_timeout must be at least db_timeout"
        );

        Self {
            buffer_size,
            db_timeout,
            long_db_timeout,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            buffer_size: BUFFER_SIZE,
            db_timeout: Duration::from_secs(DB_TIMEOUT_SECS),
            long_db_timeout: Duration::from_secs(LONG_DB_TIMEOUT_SECS),
        }
    }
}

/// Granularity at which payload sizes are rounded up before being counted
/// against [`Config::buffer_size`]; bounds per-record filesystem/metadata
/// overhead to at most one slot.
pub const SLOT_SIZE: u64 = 4096;

/// Default soft cap on total payload bytes retained (40 MiB).
pub const BUFFER_SIZE: u64 = 40 * 1024 * 1024;

/// Priority assigned to inserts made before any event is observed this dispatch.
pub const DEFAULT_PRIORITY: i64 = 10;

/// Priority assigned to inserts made once the dispatch has observed an event,
/// and retroactively to everything buffered earlier in the same dispatch.
pub const OBSERVED_PRIORITY: i64 = 50;

/// Default lock-acquisition timeout for ordinary transactions, in seconds.
pub const DB_TIMEOUT_SECS: u64 = 5;

/// Lock-acquisition timeout for schema setup and `mark_observed`, in seconds.
pub const LONG_DB_TIMEOUT_SECS: u64 = 3600;

/// Wall-clock budget given to a single HTTP POST to the collector.
pub const EXPORT_TIMEOUT: Duration = Duration::from_secs(1);

/// Wall-clock budget given to one `Pipeline::export` call.
pub const EXPORT_DEADLINE: Duration = Duration::from_secs(6);

/// How many buffered records to attempt per incoming batch, including the one
/// just inserted (2 = the new record plus one additional drain round).
pub const SENDOUT_FACTOR: u32 = 2;

/// Number of times a transient storage failure is retried before surfacing.
pub const STORAGE_RETRY_ATTEMPTS: u32 = 3;

/// Rounds `bytes` up to the next multiple of [`SLOT_SIZE`].
#[inline]
pub const fn slots_for(bytes: u64) -> u64 {
    (bytes + SLOT_SIZE - 1) / SLOT_SIZE * SLOT_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_for_rounds_up() {
        assert_eq!(slots_for(0), 0);
        assert_eq!(slots_for(1), SLOT_SIZE);
        assert_eq!(slots_for(4096), 4096);
        assert_eq!(slots_for(4097), 8192);
        assert_eq!(slots_for(4000), 4096);
    }

    #[test]
    fn default_config_matches_spec_constants() {
        let config = Config::default();
        assert_eq!(config.buffer_size, BUFFER_SIZE);
        assert_eq!(config.db_timeout, Duration::from_secs(5));
        assert_eq!(config.long_db_timeout, Duration::from_secs(3600));
    }

    #[test]
    #[should_panic(expected = "buffer_size must be non-zero")]
    fn rejects_zero_buffer_size() {
        Config::new(0, Duration::from_secs(1), Duration::from_secs(1));
    }
}
