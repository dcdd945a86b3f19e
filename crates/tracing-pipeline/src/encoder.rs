/// A single span, opaque to everything downstream of the encoder.
///
/// This is a minimal stand-in for whatever span representation a real
/// tracing SDK uses; the pipeline never inspects span contents itself, only
/// the bytes a [`BatchEncoder`] produces from them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub name: String,
    pub trace_id: [u8; 16],
    pub span_id: [u8; 8],
    pub attributes: Vec<(String, String)>,
}

/// A batch of spans handed to [`Pipeline::export`](crate::Pipeline::export)
/// by the tracing SDK's batch span processor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpanBatch {
    pub spans: Vec<Span>,
}

impl SpanBatch {
    pub fn new(spans: Vec<Span>) -> Self {
        Self { spans }
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

/// Produces the wire payload and MIME type for a batch of spans.
///
/// The buffer and exporter are payload-agnostic: whatever bytes and
/// content-type this trait returns are round-tripped unchanged to the
/// collector. Production callers are expected to supply an encoder that
/// matches their collector's wire format (commonly OTLP/protobuf or
/// OTLP/JSON); [`DefaultEncoder`] exists only to exercise this crate's own
/// tests and demo binary without a real OpenTelemetry dependency.
pub trait BatchEncoder: Send + Sync {
    fn encode(&self, batch: &SpanBatch) -> (Vec<u8>, String);
}

/// A length-prefixed, OTLP-protobuf-shaped encoding used by this crate's
/// tests and demo binary.
///
/// This is deliberately not a real protobuf encoder — it exists to give
/// `tracing-pipeline`'s own test suite deterministic, round-trippable bytes
/// without pulling in `prost` for a format this crate never parses back.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultEncoder;

impl BatchEncoder for DefaultEncoder {
    fn encode(&self, batch: &SpanBatch) -> (Vec<u8>, String) {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(batch.spans.len() as u32).to_be_bytes());
        for span in &batch.spans {
            bytes.extend_from_slice(&span.trace_id);
            bytes.extend_from_slice(&span.span_id);
            bytes.extend_from_slice(&(span.name.len() as u32).to_be_bytes());
            bytes.extend_from_slice(span.name.as_bytes());
        }
        (bytes, "application/x-protobuf".to_owned())
    }
}
