use thiserror::Error;

/// Errors surfaced synchronously by [`Lifecycle`](crate::Lifecycle)
/// operations. Network, TLS, and storage errors never reach here — they are
/// handled (and logged) inside the pipeline/exporter per the error
/// taxonomy in the workspace design notes.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// `set_destination` was called with a URL that doesn't start with
    /// `http://` or `https://`.
    #[error(transparent)]
    InvalidDestination(#[from] tracing_export::ConfigError),
    /// `setup` could not open or create the buffer file.
    #[error(transparent)]
    Pipeline(#[from] tracing_pipeline::PipelineError),
    /// An operation that requires `setup` to have run first (`set_destination`,
    /// `mark_observed`, `shutdown`) was called on an uninitialized lifecycle.
    #[error("tracing lifecycle has not been set up")]
    NotSetUp,
    /// The underlying store could not complete `mark_observed`, even after
    /// retrying transient lock contention.
    #[error(transparent)]
    Buffer(#[from] tracing_store::BufferError),
}
