//! `tracing-lifecycle` — process-wide setup/teardown for the tracing
//! pipeline: resolves the buffer path from the Juju environment, builds
//! resource attributes, and mediates destination changes and "observed"
//! transitions against the shared [`Lifecycle`].
//!
//! Most callers use the module-level functions ([`setup`],
//! [`set_destination`], [`shutdown`]), which wrap a single process-wide
//! instance behind a [`std::sync::OnceLock`]. Tests, and callers who'd
//! rather thread a context object through instead of relying on global
//! state, can use [`Lifecycle`] directly.

mod environment;
mod error;
mod global;
mod lifecycle;
mod resource;

pub use environment::{Environment, JujuContext, MapEnvironment, ProcessEnvironment};
pub use error::LifecycleError;
pub use global::{set_destination, setup, setup_with_environment, shutdown};
pub use lifecycle::{Lifecycle, BUFFER_FILE_NAME};
pub use resource::ResourceAttributes;
