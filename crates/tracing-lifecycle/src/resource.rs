use crate::environment::JujuContext;

/// The OpenTelemetry resource attributes attached to every span emitted by
/// this process, built once at `setup`.
///
/// Three historically-distinct attribute layouts from the source material
/// are all carried here for compatibility, per the service-identity open
/// question: `service.name` as the charm-class name (this crate's contract),
/// `service.namespace`/`service.instance.id` as the OTel-conventional
/// model/unit pairing, and the `juju_*` topology keys the original exporter
/// attaches directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceAttributes {
    pairs: Vec<(String, String)>,
}

impl ResourceAttributes {
    pub fn build(charm_class_name: &str, juju: &JujuContext) -> Self {
        let mut pairs = vec![("service.name".to_owned(), charm_class_name.to_owned())];

        if let Some(model_name) = &juju.model_name {
            pairs.push(("service.namespace".to_owned(), model_name.clone()));
            pairs.push(("juju_model".to_owned(), model_name.clone()));
        }
        if let Some(unit_name) = &juju.unit_name {
            pairs.push(("service.instance.id".to_owned(), unit_name.clone()));
            pairs.push(("juju_unit".to_owned(), unit_name.clone()));
        }
        if let Some(application_name) = juju.application_name() {
            pairs.push(("juju_application".to_owned(), application_name));
        }
        if let Some(model_uuid) = &juju.model_uuid {
            pairs.push(("juju_model_uuid".to_owned(), model_uuid.clone()));
        }

        Self { pairs }
    }

    /// The attributes as `(key, value)` pairs, in a stable, deterministic
    /// order suitable for handing to an OTel `Resource` builder.
    pub fn as_pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}
