use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};
use tracing_export::{Destination, Exporter};
use tracing_pipeline::Pipeline;

use crate::environment::{Environment, JujuContext};
use crate::error::LifecycleError;
use crate::resource::ResourceAttributes;

/// The filename the buffer lives at inside the charm directory.
pub const BUFFER_FILE_NAME: &str = ".tracing-data.db";

/// Owns one process's tracing pipeline: the resource attributes computed at
/// `setup`, the buffer file location, and the shared `Exporter`/`Pipeline`
/// pair that the dispatch thread and the background export worker both talk
/// to.
pub struct Lifecycle {
    resource: ResourceAttributes,
    buffer_path: PathBuf,
    exporter: Arc<Exporter>,
    pipeline: Arc<Pipeline<Arc<Exporter>>>,
}

impl Lifecycle {
    /// Reads invocation-identifying fields from `environment`, derives
    /// resource attributes and the buffer path, and wires up a fresh
    /// Store -> Buffer -> Exporter -> Pipeline stack.
    ///
    /// Infallible except for the buffer file itself failing to open — a
    /// missing `JUJU_CHARM_DIR` degrades to the process's current directory
    /// rather than aborting, matching the "missing values degrade resource
    /// attributes but do not abort setup" contract.
    pub fn setup(
        charm_class_name: &str,
        environment: &impl Environment,
    ) -> Result<Self, LifecycleError> {
        let juju = JujuContext::from_environment(environment);
        let resource = ResourceAttributes::build(charm_class_name, &juju);

        let charm_dir = juju.charm_dir.clone().unwrap_or_else(|| {
            warn!("JUJU_CHARM_DIR not set, falling back to the process's current directory");
            ".".to_owned()
        });
        let buffer_path = PathBuf::from(charm_dir).join(BUFFER_FILE_NAME);

        let exporter = Arc::new(Exporter::new());
        let pipeline = Arc::new(Pipeline::open(buffer_path.clone(), exporter.clone())?);

        debug!(path = %buffer_path.display(), "tracing lifecycle set up");
        Ok(Self {
            resource,
            buffer_path,
            exporter,
            pipeline,
        })
    }

    /// The resource attributes computed at `setup`, for handing to a
    /// `TracerProvider`.
    pub fn resource(&self) -> &ResourceAttributes {
        &self.resource
    }

    /// The buffer file this lifecycle's pipeline persists to.
    pub fn buffer_path(&self) -> &Path {
        &self.buffer_path
    }

    /// The pipeline this lifecycle installs as the sink of a batched span
    /// processor.
    pub fn pipeline(&self) -> &Arc<Pipeline<Arc<Exporter>>> {
        &self.pipeline
    }

    /// Validates `url`, updates the exporter's destination, and promotes
    /// this dispatch's buffered records to `OBSERVED` priority.
    ///
    /// The destination becoming known is the only reliable signal that this
    /// dispatch's spans are worth keeping, since it means a relation read
    /// succeeded; that's why this single call both configures the exporter
    /// and triggers `mark_observed`.
    pub fn set_destination(
        &self,
        url: Option<String>,
        ca_pem: Option<String>,
    ) -> Result<(), LifecycleError> {
        let destination = Destination::new(url, ca_pem)?;
        self.exporter.set_destination(destination);
        self.pipeline.buffer().mark_observed()?;
        debug!("tracing destination updated, dispatch marked observed");
        Ok(())
    }

    /// Delegates to the tracing SDK's own shutdown, which is expected to
    /// flush any pending batches through `export`. Any error or panic from
    /// `sdk_shutdown` is caught, logged, and swallowed — shutdown must never
    /// raise.
    pub fn shutdown(&self, sdk_shutdown: impl FnOnce() -> Result<(), Box<dyn std::error::Error>>) {
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(sdk_shutdown));
        match outcome {
            Ok(Ok(())) => debug!("tracing SDK shutdown completed"),
            Ok(Err(error)) => warn!(%error, "tracing SDK shutdown returned an error"),
            Err(_) => warn!("tracing SDK shutdown panicked"),
        }
        self.pipeline.shutdown();
    }
}
