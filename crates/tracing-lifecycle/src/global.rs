use std::sync::{Mutex, OnceLock};

use crate::environment::{Environment, ProcessEnvironment};
use crate::error::LifecycleError;
use crate::lifecycle::Lifecycle;

/// The process-wide pipeline instance: lazily created on the first
/// `setup` call, explicitly torn down by `shutdown`. Modeled as a
/// module-level handle rather than threaded through a context object,
/// since the charm framework this crate plugs into has no natural place to
/// carry one.
static LIFECYCLE: OnceLock<Mutex<Option<Lifecycle>>> = OnceLock::new();

fn cell() -> &'static Mutex<Option<Lifecycle>> {
    LIFECYCLE.get_or_init(|| Mutex::new(None))
}

/// Sets up the process-wide tracing lifecycle by reading the real process
/// environment. Safe to call more than once; each call replaces the
/// previous instance (and its in-memory session state) with a fresh one.
pub fn setup(charm_class_name: &str) -> Result<(), LifecycleError> {
    setup_with_environment(charm_class_name, &ProcessEnvironment)
}

/// Same as [`setup`], but reads from a caller-supplied [`Environment`]
/// instead of the real process environment; used by tests.
pub fn setup_with_environment(
    charm_class_name: &str,
    environment: &impl Environment,
) -> Result<(), LifecycleError> {
    let lifecycle = Lifecycle::setup(charm_class_name, environment)?;
    *cell().lock().unwrap() = Some(lifecycle);
    Ok(())
}

/// Validates `url`, updates the exporter's destination, and marks this
/// dispatch observed. Returns [`LifecycleError::NotSetUp`] if `setup` was
/// never called.
pub fn set_destination(url: Option<String>, ca_pem: Option<String>) -> Result<(), LifecycleError> {
    let guard = cell().lock().unwrap();
    let lifecycle = guard.as_ref().ok_or(LifecycleError::NotSetUp)?;
    lifecycle.set_destination(url, ca_pem)
}

/// Delegates to the tracing SDK's shutdown via `sdk_shutdown`, then drops
/// the process-wide lifecycle. A no-op (not an error) if `setup` was never
/// called, since "the dependency is absent" is a valid deployment state.
pub fn shutdown(sdk_shutdown: impl FnOnce() -> Result<(), Box<dyn std::error::Error>>) {
    let mut guard = cell().lock().unwrap();
    if let Some(lifecycle) = guard.take() {
        lifecycle.shutdown(sdk_shutdown);
    }
}
