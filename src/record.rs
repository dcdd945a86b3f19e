/// A persisted tracing payload.
///
/// Records are immutable except for `priority`, which only ever moves from
/// [`DEFAULT_PRIORITY`](crate::config::DEFAULT_PRIORITY) to
/// [`OBSERVED_PRIORITY`](crate::config::OBSERVED_PRIORITY).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Monotonically increasing identifier assigned at insertion.
    pub id: i64,
    /// Current priority; see [`crate::config`] for the two defined values.
    pub priority: i64,
    /// Opaque payload bytes.
    pub payload: Vec<u8>,
    /// Short content-type string, round-tripped unchanged to the collector.
    pub content_type: String,
}
