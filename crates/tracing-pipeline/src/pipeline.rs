use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};
use tracing_store::{Buffer, Config as StoreConfig};

use crate::clock::{Clock, SystemClock};
use crate::encoder::{BatchEncoder, DefaultEncoder, SpanBatch};
use crate::error::PipelineError;
use crate::sink::Sink;
use crate::suspend::LogSuspend;

/// Wall-clock budget given to one [`Pipeline::export`] call.
pub const EXPORT_DEADLINE: Duration = Duration::from_secs(6);

/// How many buffered records `export` attempts per incoming batch, including
/// the one just inserted.
pub const SENDOUT_FACTOR: u32 = 2;

/// Background span-batch sink: accepts batches from the tracing SDK and
/// drives the [`Buffer`] and a [`Sink`] (normally [`tracing_export::Exporter`])
/// under a wall-clock deadline.
///
/// `export` never returns an error: a failure to even persist the batch is
/// logged and the batch is dropped, rather than propagated to the SDK, which
/// has no useful way to handle an export failure beyond buffering — which is
/// exactly what this pipeline exists to do on its behalf.
pub struct Pipeline<S: Sink, C: Clock = SystemClock> {
    buffer: Arc<Buffer>,
    sink: S,
    clock: C,
    encoder: Box<dyn BatchEncoder>,
    log_suspend: LogSuspend,
}

impl<S: Sink> Pipeline<S, SystemClock> {
    /// Opens (or creates) the buffer file at `path` and builds a pipeline
    /// around it using the real system clock and the default span encoder.
    pub fn open(path: impl Into<PathBuf>, sink: S) -> Result<Self, PipelineError> {
        Self::open_with(path, StoreConfig::default(), sink, SystemClock, Box::new(DefaultEncoder))
    }
}

impl<S: Sink, C: Clock> Pipeline<S, C> {
    /// Builds a pipeline over an already-open buffer, with full control over
    /// the clock and encoder; used by tests and by [`Lifecycle`]
    /// construction.
    pub fn with_buffer(
        buffer: Arc<Buffer>,
        sink: S,
        clock: C,
        encoder: Box<dyn BatchEncoder>,
    ) -> Self {
        Self {
            buffer,
            sink,
            clock,
            encoder,
            log_suspend: LogSuspend::new(),
        }
    }

    /// Opens the buffer file at `path` and builds a pipeline with a custom
    /// clock and encoder (`Store`/`Buffer` configuration is also
    /// caller-supplied, matching [`tracing_store::Buffer::open`]).
    pub fn open_with(
        path: impl Into<PathBuf>,
        store_config: StoreConfig,
        sink: S,
        clock: C,
        encoder: Box<dyn BatchEncoder>,
    ) -> Result<Self, PipelineError> {
        let buffer = Buffer::open(path, store_config)?;
        Ok(Self::with_buffer(Arc::new(buffer), sink, clock, encoder))
    }

    /// The underlying buffer, shared with [`Lifecycle`] so that
    /// `mark_observed` on the dispatch thread and `export` on the background
    /// worker thread see the same session state.
    pub fn buffer(&self) -> &Arc<Buffer> {
        &self.buffer
    }

    /// Accepts one batch of spans from the tracing SDK's batch span
    /// processor.
    ///
    /// Per-invocation protocol:
    /// 1. Establish a deadline `EXPORT_DEADLINE` out.
    /// 2. Encode the batch and `pump` it into the buffer; this is the record
    ///    that was just inserted, so a head is guaranteed.
    /// 3. Attempt to send that head; on success, remove it.
    /// 4. Up to `SENDOUT_FACTOR - 1` additional drain rounds while the
    ///    deadline hasn't passed and the buffer still has a head; stop at
    ///    the first send failure or empty buffer.
    ///
    /// Always returns `true`: a failure to persist is logged and the batch
    /// is lost rather than surfaced, so the SDK never sees a buffered write
    /// as a failed export.
    pub fn export(&self, batch: &SpanBatch) -> bool {
        let _guard = self.log_suspend.suspend();

        if batch.is_empty() {
            return true;
        }

        let deadline = self.clock.now() + EXPORT_DEADLINE;
        let (payload, content_type) = self.encoder.encode(batch);

        let head = match self.buffer.pump(Some((&payload, &content_type))) {
            Ok(head) => head,
            Err(error) => {
                warn!(%error, "failed to persist span batch, dropping it");
                return true;
            }
        };

        let Some(head) = head else {
            // The batch we just inserted must be in the store; a missing
            // head here would mean the insert silently failed without
            // erroring, which the Buffer contract rules out.
            warn!("pump returned no head immediately after insertion");
            return true;
        };

        self.attempt_send_and_remove(&head.payload, &head.content_type, head.id);

        for _ in 0..SENDOUT_FACTOR - 1 {
            if self.clock.now() >= deadline {
                break;
            }
            let head = match self.buffer.pump(None) {
                Ok(Some(head)) => head,
                Ok(None) => break,
                Err(error) => {
                    warn!(%error, "failed to read next head during drain");
                    break;
                }
            };
            if !self.attempt_send_and_remove(&head.payload, &head.content_type, head.id) {
                break;
            }
        }

        true
    }

    fn attempt_send_and_remove(&self, payload: &[u8], content_type: &str, id: i64) -> bool {
        let sent = self.sink.send(payload, content_type).is_sent();
        if sent {
            if let Err(error) = self.buffer.remove(id) {
                warn!(%error, id, "export succeeded but failed to remove the record");
            } else {
                debug!(id, "exported and removed buffered record");
            }
        } else {
            debug!(id, "export attempt failed, record retained");
        }
        sent
    }

    /// No-op: buffering here is explicit (every batch is persisted before
    /// being attempted), so there is nothing held back to flush.
    pub fn force_flush(&self) {}

    /// No-op: the tracing SDK's own shutdown drains pending batches through
    /// `export`, which this pipeline already handles synchronously.
    pub fn shutdown(&self) {}
}
