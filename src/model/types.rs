//! Descriptor types handed to the assembly pipeline by the builder layer.

use crate::network::EquipmentKind;
use crate::params::Parameter;
use crate::version::VersionInterval;

use serde::Deserialize;

/// A `from -> to` variable-name pair.
///
/// Used both inside macro-connector templates (model var to target var) and
/// in static references (dynamic var to network var).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VarMapping {
    pub from: String,
    pub to: String,
}

impl VarMapping {
    pub fn new(from: &str, to: &str) -> Self {
        VarMapping {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

/// The far end of a requested connection.
///
/// Equipment references resolve through the equipment namespace of the
/// registry, pure references through the pure namespace; the same id string
/// can exist in both without ambiguity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetRef {
    /// The model bound to this equipment id, whichever it turns out to be.
    Equipment(String),
    /// A pure dynamic model, addressed by its own id.
    Pure(String),
}

impl TargetRef {
    /// Reference that resolves back to `model`: by equipment identity when it
    /// is attached, by dynamic id otherwise.
    pub fn to_model(model: &ModelDescriptor) -> Self {
        match &model.equipment_id {
            Some(eq) => TargetRef::Equipment(eq.clone()),
            None => TargetRef::Pure(model.dynamic_id.clone()),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            TargetRef::Equipment(id) | TargetRef::Pure(id) => id,
        }
    }
}

/// One wiring request declared by a descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionRequest {
    /// Name of the macro-connector template. Requests sharing a name must
    /// carry identical mappings; the template is registered once.
    pub connector: String,
    pub mappings: Vec<VarMapping>,
    pub target: TargetRef,
}

impl ConnectionRequest {
    pub fn new(connector: &str, mappings: Vec<VarMapping>, target: TargetRef) -> Self {
        ConnectionRequest {
            connector: connector.to_string(),
            mappings,
            target,
        }
    }
}

/// Flags describing how a model participates in assembly.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModelCapabilities {
    /// Participates in frequency-based grid coordination.
    pub frequency_synchronized: bool,
    /// Participates in aggregate signal-N coordination. Mutually exclusive
    /// with `frequency_synchronized` across the whole accepted set.
    pub signal_n: bool,
    /// Frequency reference is anchored to a specific bus rather than to the
    /// global reference.
    pub synchronized_to_bus: bool,
    /// The model only works alongside explicitly declared companions; its
    /// connection targets must never fall back to defaults.
    pub requires_companions: bool,
    /// Equipment kinds that must be entirely covered by explicit models
    /// whenever this model is accepted.
    pub forbids_defaults: Vec<EquipmentKind>,
}

/// A dynamic behavioral model declaration.
///
/// `dynamic_id` is unique across models *and* events after filtering;
/// `equipment_id` is present for equipment-attached models and absent for
/// pure ones (automations, coordination models).
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDescriptor {
    pub dynamic_id: String,
    /// Library tag naming the behavioral implementation.
    pub library: String,
    pub equipment_id: Option<String>,
    pub version: VersionInterval,
    pub capabilities: ModelCapabilities,
    /// Id of the parameter set the model reads at simulation time.
    pub parameter_set_id: String,
    pub connections: Vec<ConnectionRequest>,
    /// Dynamic-to-network variable exposure, identical for every model of
    /// the same library.
    pub static_vars: Vec<VarMapping>,
    /// Inline parameter entries, collected into the run's parameter bank on
    /// acceptance.
    pub parameters: Vec<Parameter>,
}

impl ModelDescriptor {
    /// Pure model with defaults everywhere else; the parameter-set id
    /// defaults to the dynamic id.
    pub fn new(dynamic_id: &str, library: &str) -> Self {
        ModelDescriptor {
            dynamic_id: dynamic_id.to_string(),
            library: library.to_string(),
            equipment_id: None,
            version: VersionInterval::default(),
            capabilities: ModelCapabilities::default(),
            parameter_set_id: dynamic_id.to_string(),
            connections: Vec::new(),
            static_vars: Vec::new(),
            parameters: Vec::new(),
        }
    }

    /// Model attached to a grid element.
    pub fn for_equipment(dynamic_id: &str, library: &str, equipment_id: &str) -> Self {
        let mut model = ModelDescriptor::new(dynamic_id, library);
        model.equipment_id = Some(equipment_id.to_string());
        model
    }

    pub fn is_equipment_attached(&self) -> bool {
        self.equipment_id.is_some()
    }
}

/// Identity facts shared by model and event descriptors, letting the
/// acceptance filters treat both uniformly.
pub trait Descriptor {
    fn dynamic_id(&self) -> &str;
    fn library(&self) -> &str;
    fn version(&self) -> &VersionInterval;
}

impl Descriptor for ModelDescriptor {
    fn dynamic_id(&self) -> &str {
        &self.dynamic_id
    }

    fn library(&self) -> &str {
        &self.library
    }

    fn version(&self) -> &VersionInterval {
        &self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameter_set_id_defaults_to_dynamic_id() {
        let model = ModelDescriptor::new("tap_changer", "TapChangerAutomaton");
        assert_eq!(model.parameter_set_id, "tap_changer");
        assert!(model.equipment_id.is_none());
    }

    #[test]
    fn target_ref_prefers_equipment_identity() {
        let pure = ModelDescriptor::new("automaton", "CurrentLimit");
        assert_eq!(TargetRef::to_model(&pure), TargetRef::Pure("automaton".into()));

        let attached = ModelDescriptor::for_equipment("g1", "GeneratorFourWindings", "G1");
        assert_eq!(TargetRef::to_model(&attached), TargetRef::Equipment("G1".into()));
    }

    #[test]
    fn capabilities_default_to_inert() {
        let caps = ModelCapabilities::default();
        assert!(!caps.frequency_synchronized);
        assert!(!caps.signal_n);
        assert!(!caps.synchronized_to_bus);
        assert!(!caps.requires_companions);
        assert!(caps.forbids_defaults.is_empty());
    }
}
