//! `tracing-pipeline` — the background span-batch sink that sits between the
//! tracing SDK and the durable buffer.
//!
//! [`Pipeline::export`] is the only operation the tracing SDK calls; it
//! persists the batch, then opportunistically drains the buffer through a
//! [`Sink`] within a wall-clock deadline, all without ever reporting failure
//! back to the SDK.

mod clock;
mod encoder;
mod error;
mod pipeline;
mod sink;
mod suspend;

pub use clock::{Clock, FakeClock, SystemClock};
pub use encoder::{BatchEncoder, DefaultEncoder, Span, SpanBatch};
pub use error::PipelineError;
pub use pipeline::{Pipeline, EXPORT_DEADLINE, SENDOUT_FACTOR};
pub use sink::Sink;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::test_support::ScriptedSink;
    use std::time::Duration;
    use tracing_export::SendOutcome;
    use tracing_store::Config as StoreConfig;

    fn batch(label: &str) -> SpanBatch {
        SpanBatch::new(vec![Span {
            name: label.to_owned(),
            trace_id: [1; 16],
            span_id: [2; 8],
            attributes: vec![],
        }])
    }

    #[test]
    fn export_success_removes_the_record() {
        let dir = tempfile::tempdir().unwrap();
        let sink = ScriptedSink::new(vec![SendOutcome::Sent]);
        let pipeline = Pipeline::open(dir.path().join("buffer.db"), sink).unwrap();

        assert!(pipeline.export(&batch("span1")));
        assert!(pipeline.buffer().pump(None).unwrap().is_none());
    }

    #[test]
    fn export_failure_retains_the_record() {
        let dir = tempfile::tempdir().unwrap();
        let sink = ScriptedSink::new(vec![SendOutcome::NotSent]);
        let pipeline = Pipeline::open(dir.path().join("buffer.db"), sink).unwrap();

        assert!(pipeline.export(&batch("span1")));
        assert!(pipeline.buffer().pump(None).unwrap().is_some());
    }

    #[test]
    fn second_export_drains_both_records_when_first_round_fails_then_retries() {
        let dir = tempfile::tempdir().unwrap();
        // First export: NotSent. Second export: inserts span2, attempts
        // span1 first (oldest/lowest id), fails again leaving both.
        let sink = ScriptedSink::new(vec![SendOutcome::NotSent, SendOutcome::NotSent]);
        let pipeline = Pipeline::open(dir.path().join("buffer.db"), sink).unwrap();

        assert!(pipeline.export(&batch("span1")));
        assert!(pipeline.export(&batch("span2")));

        let mut remaining = 0;
        while let Some(head) = pipeline.buffer().pump(None).unwrap() {
            pipeline.buffer().remove(head.id).unwrap();
            remaining += 1;
        }
        assert_eq!(remaining, 2, "both records survive two failed export rounds");
    }

    #[test]
    fn deadline_bounds_the_number_of_send_attempts() {
        use std::sync::Arc;

        let dir = tempfile::tempdir().unwrap();
        let clock = FakeClock::new();
        // Every send call advances the clock 3s; with EXPORT_DEADLINE=6s and
        // SENDOUT_FACTOR=2, at most two send calls should happen even though
        // there are three records available to drain.
        let sink = Arc::new(
            ScriptedSink::new(vec![SendOutcome::NotSent; 8])
                .with_delay(Duration::from_secs(3), clock.clone()),
        );
        let pipeline = Pipeline::open_with(
            dir.path().join("buffer.db"),
            StoreConfig::default(),
            sink.clone(),
            clock,
            Box::new(DefaultEncoder),
        )
        .unwrap();

        pipeline.buffer().pump(Some((b"pre-existing-1", "m"))).unwrap();
        pipeline.buffer().pump(Some((b"pre-existing-2", "m"))).unwrap();

        assert!(pipeline.export(&batch("span3")));
        assert_eq!(sink.call_count(), 2, "SENDOUT_FACTOR caps attempts at 2");
    }

    #[test]
    fn empty_batch_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let sink = ScriptedSink::new(vec![SendOutcome::Sent]);
        let pipeline = Pipeline::open(dir.path().join("buffer.db"), sink).unwrap();

        assert!(pipeline.export(&SpanBatch::default()));
        assert!(pipeline.buffer().pump(None).unwrap().is_none());
    }
}
