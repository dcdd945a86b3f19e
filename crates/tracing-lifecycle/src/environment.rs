/// Source of the invocation-identifying environment variables read at
/// `setup`. Abstracted behind a trait so tests can supply a fixed map
/// instead of mutating the real process environment, which is global and
/// shared across the whole test binary.
pub trait Environment {
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads from `std::env`, the real source used outside tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// A fixed key/value map, for tests that need to exercise `setup` without
/// touching the real process environment.
#[derive(Debug, Default, Clone)]
pub struct MapEnvironment {
    values: std::collections::HashMap<String, String>,
}

impl MapEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.values.insert(key.to_owned(), value.into());
        self
    }
}

impl Environment for MapEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// The Juju environment variables read at `setup`, each individually
/// optional — a missing value degrades resource attributes but never aborts
/// setup.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct JujuContext {
    pub unit_name: Option<String>,
    pub model_name: Option<String>,
    pub model_uuid: Option<String>,
    pub charm_dir: Option<String>,
    pub dispatch_path: Option<String>,
}

impl JujuContext {
    pub fn from_environment(environment: &impl Environment) -> Self {
        Self {
            unit_name: environment.var("JUJU_UNIT_NAME"),
            model_name: environment.var("JUJU_MODEL_NAME"),
            model_uuid: environment.var("JUJU_MODEL_UUID"),
            charm_dir: environment.var("JUJU_CHARM_DIR"),
            dispatch_path: environment.var("JUJU_DISPATCH_PATH"),
        }
    }

    /// The application name, derived from `unit_name` (`"app/0"` ->
    /// `"app"`), absent if `unit_name` itself is absent.
    pub fn application_name(&self) -> Option<String> {
        self.unit_name
            .as_deref()
            .and_then(|unit| unit.split('/').next())
            .map(str::to_owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn application_name_splits_on_slash() {
        let ctx = JujuContext {
            unit_name: Some("my-app/0".into()),
            ..Default::default()
        };
        assert_eq!(ctx.application_name(), Some("my-app".into()));
    }

    #[test]
    fn missing_unit_name_means_missing_application_name() {
        let ctx = JujuContext::default();
        assert_eq!(ctx.application_name(), None);
    }

    #[test]
    fn map_environment_round_trips_values() {
        let env = MapEnvironment::new()
            .with("JUJU_UNIT_NAME", "my-app/0")
            .with("JUJU_MODEL_NAME", "my-model");
        let ctx = JujuContext::from_environment(&env);
        assert_eq!(ctx.unit_name, Some("my-app/0".into()));
        assert_eq!(ctx.model_name, Some("my-model".into()));
        assert_eq!(ctx.model_uuid, None);
    }
}
