//! Lookup index over the accepted model set.

use std::collections::HashMap;

use crate::model::types::{ModelDescriptor, TargetRef};
use crate::network::Network;

/// Id of the implicit network model.
///
/// Every static grid element belongs to it, so connections targeting it
/// always resolve. Events fall back to it when their target equipment has no
/// dynamic model of its own.
pub const NETWORK_ID: &str = "NETWORK";

/// Accepted models indexed by identity, split into two namespaces.
///
/// Equipment-attached models are keyed by equipment id, pure models by
/// dynamic id. The same id string may appear in both namespaces without
/// collision. The registry borrows the descriptors it indexes.
#[derive(Debug, Default)]
pub struct ModelRegistry<'a> {
    equipment: HashMap<&'a str, &'a ModelDescriptor>,
    pure: HashMap<&'a str, &'a ModelDescriptor>,
}

impl<'a> ModelRegistry<'a> {
    /// Indexes a slice of accepted models. Within a namespace the first
    /// occurrence of a key wins; the acceptance filters have already removed
    /// duplicate dynamic ids upstream.
    pub fn index(models: &'a [ModelDescriptor]) -> Self {
        let mut registry = ModelRegistry::default();
        for model in models {
            match &model.equipment_id {
                Some(eq) => {
                    registry.equipment.entry(eq.as_str()).or_insert(model);
                }
                None => {
                    registry.pure.entry(model.dynamic_id.as_str()).or_insert(model);
                }
            }
        }
        registry
    }

    /// Model attached to the given equipment, if any.
    pub fn equipment(&self, equipment_id: &str) -> Option<&'a ModelDescriptor> {
        self.equipment.get(equipment_id).copied()
    }

    /// Pure model with the given dynamic id, if any.
    pub fn pure(&self, dynamic_id: &str) -> Option<&'a ModelDescriptor> {
        self.pure.get(dynamic_id).copied()
    }

    /// Resolves a connection target to its model, honoring the namespace the
    /// reference names.
    pub fn resolve(&self, target: &TargetRef) -> Option<&'a ModelDescriptor> {
        match target {
            TargetRef::Equipment(id) => self.equipment(id),
            TargetRef::Pure(id) => self.pure(id),
        }
    }

    /// Folds another registry into this one. Entries already present win,
    /// so merging a base registry with extensions keeps the base bindings.
    pub fn merge(mut self, other: ModelRegistry<'a>) -> Self {
        for (id, model) in other.equipment {
            self.equipment.entry(id).or_insert(model);
        }
        for (id, model) in other.pure {
            self.pure.entry(id).or_insert(model);
        }
        self
    }

    /// Whether the model resolved by `id` reports itself connected.
    ///
    /// The pure namespace takes precedence: pure models have no terminals
    /// and always count as connected. An equipment-attached model is
    /// connected when every terminal of its equipment is. Ids resolving to
    /// nothing are not connected.
    pub fn is_connected(&self, id: &str, network: &dyn Network) -> bool {
        if self.pure.contains_key(id) {
            return true;
        }
        match self.equipment.get(id) {
            Some(model) => model
                .equipment_id
                .as_deref()
                .is_some_and(|eq| network.is_fully_connected(eq)),
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.equipment.len() + self.pure.len()
    }

    pub fn is_empty(&self) -> bool {
        self.equipment.is_empty() && self.pure.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{EquipmentKind, StaticNetwork, Terminal};

    fn models() -> Vec<ModelDescriptor> {
        vec![
            ModelDescriptor::for_equipment("g1", "GeneratorFourWindings", "G1"),
            ModelDescriptor::for_equipment("ln1", "LineModel", "LN1"),
            ModelDescriptor::new("G1", "TapChangerAutomaton"),
        ]
    }

    fn network() -> StaticNetwork {
        let mut net = StaticNetwork::new("test");
        net.add_bus("B1", true, true);
        net.add_equipment("G1", EquipmentKind::Generator, vec![Terminal::connected("B1")]);
        net.add_equipment(
            "LN1",
            EquipmentKind::Line,
            vec![Terminal::connected("B1"), Terminal::disconnected()],
        );
        net
    }

    #[test]
    fn namespaces_do_not_collide() {
        let models = models();
        let registry = ModelRegistry::index(&models);
        // "G1" names a generator's equipment binding and a pure automaton.
        assert_eq!(registry.equipment("G1").unwrap().dynamic_id, "g1");
        assert_eq!(registry.pure("G1").unwrap().library, "TapChangerAutomaton");
        assert!(registry.pure("g1").is_none());
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn resolve_honors_reference_kind() {
        let models = models();
        let registry = ModelRegistry::index(&models);
        let by_eq = registry.resolve(&TargetRef::Equipment("G1".into())).unwrap();
        assert_eq!(by_eq.dynamic_id, "g1");
        let by_id = registry.resolve(&TargetRef::Pure("G1".into())).unwrap();
        assert_eq!(by_id.dynamic_id, "G1");
        assert!(registry.resolve(&TargetRef::Equipment("X".into())).is_none());
    }

    #[test]
    fn merge_keeps_existing_entries() {
        let base = vec![ModelDescriptor::for_equipment("g1", "GeneratorFourWindings", "G1")];
        let extra = vec![
            ModelDescriptor::for_equipment("other", "GeneratorPV", "G1"),
            ModelDescriptor::new("automaton", "CurrentLimit"),
        ];
        let merged = ModelRegistry::index(&base).merge(ModelRegistry::index(&extra));
        assert_eq!(merged.equipment("G1").unwrap().dynamic_id, "g1");
        assert!(merged.pure("automaton").is_some());
    }

    #[test]
    fn connection_state_follows_namespace_precedence() {
        let models = models();
        let registry = ModelRegistry::index(&models);
        let net = network();
        // Pure model: connected by definition, even though equipment "G1"
        // shares the id.
        assert!(registry.is_connected("G1", &net));
        // Equipment-attached lookups use terminal state.
        assert!(!registry.is_connected("LN1", &net));
        assert!(!registry.is_connected("unknown", &net));
    }

    #[test]
    fn equipment_connection_requires_all_terminals() {
        let models = vec![ModelDescriptor::for_equipment("ln1", "LineModel", "LN1")];
        let registry = ModelRegistry::index(&models);
        let mut net = network();
        assert!(!registry.is_connected("LN1", &net));
        net.add_equipment(
            "LN1",
            EquipmentKind::Line,
            vec![Terminal::connected("B1"), Terminal::connected("B1")],
        );
        assert!(registry.is_connected("LN1", &net));
    }
}
