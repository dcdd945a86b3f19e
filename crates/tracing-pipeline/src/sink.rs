use std::sync::Arc;

use tracing_export::{Exporter, SendOutcome};

/// The outbound side of a [`Pipeline`](crate::Pipeline): anything that can
/// attempt to deliver one payload and report whether it landed.
///
/// Implemented for [`tracing_export::Exporter`] directly; tests substitute a
/// fake that can be made to fail or to stall past the deadline without a real
/// socket.
pub trait Sink: Send + Sync {
    fn send(&self, payload: &[u8], content_type: &str) -> SendOutcome;
}

impl Sink for Exporter {
    fn send(&self, payload: &[u8], content_type: &str) -> SendOutcome {
        Exporter::send(self, payload, content_type)
    }
}

impl<T: Sink + ?Sized> Sink for Arc<T> {
    fn send(&self, payload: &[u8], content_type: &str) -> SendOutcome {
        T::send(self, payload, content_type)
    }
}
