use thiserror::Error;

/// Raised only by construction (`Pipeline::open`); `export` itself never
/// surfaces an error to its caller, per the pipeline's contract that the
/// tracing SDK must never observe a buffered write as a failed export.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Store(#[from] tracing_store::BufferError),
}
