//! Topology-driven reduction of the accepted model set.
//!
//! Simplifiers run in registration order, each seeing the survivors of the
//! previous one. Removal simplifiers veto models; substitution simplifiers
//! rewrite them (or remove them by returning nothing). Models without an
//! equipment binding pass through untouched: simplification reasons about
//! grid topology, and pure models have none.

use crate::model::ModelDescriptor;
use crate::network::Network;
use crate::report::{AssemblyReport, WarningKind};

/// Veto stage: decides whether an equipment-attached model stays.
pub trait RemovalSimplifier {
    /// Name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Returns false to drop the model. Implementations explain themselves
    /// through `report`.
    fn should_keep(
        &self,
        model: &ModelDescriptor,
        network: &dyn Network,
        report: &mut AssemblyReport,
    ) -> bool;
}

/// Rewrite stage: maps a model to its replacement, or to nothing.
pub trait SubstitutionSimplifier {
    fn name(&self) -> &'static str;

    /// Returns the model to keep in place of `model`. Returning `None`
    /// removes it; implementations report removals themselves.
    fn substitute(
        &self,
        model: ModelDescriptor,
        network: &dyn Network,
        report: &mut AssemblyReport,
    ) -> Option<ModelDescriptor>;
}

enum Stage {
    Removal(Box<dyn RemovalSimplifier>),
    Substitution(Box<dyn SubstitutionSimplifier>),
}

/// Ordered, caller-extensible chain of simplification stages.
pub struct SimplifierChain {
    stages: Vec<Stage>,
}

impl SimplifierChain {
    /// Chain with no stages at all.
    pub fn empty() -> Self {
        SimplifierChain { stages: Vec::new() }
    }

    /// The built-in chain: energization check, then main-component check.
    pub fn builtin() -> Self {
        let mut chain = SimplifierChain::empty();
        chain.push_removal(Box::new(Energized));
        chain.push_removal(Box::new(MainComponent));
        chain
    }

    pub fn push_removal(&mut self, simplifier: Box<dyn RemovalSimplifier>) {
        self.stages.push(Stage::Removal(simplifier));
    }

    pub fn push_substitution(&mut self, simplifier: Box<dyn SubstitutionSimplifier>) {
        self.stages.push(Stage::Substitution(simplifier));
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Runs every stage over the model list, preserving order among the
    /// survivors.
    pub fn apply(
        &self,
        models: Vec<ModelDescriptor>,
        network: &dyn Network,
        report: &mut AssemblyReport,
    ) -> Vec<ModelDescriptor> {
        let mut current = models;
        for stage in &self.stages {
            current = match stage {
                Stage::Removal(simplifier) => current
                    .into_iter()
                    .filter(|model| {
                        !model.is_equipment_attached()
                            || simplifier.should_keep(model, network, report)
                    })
                    .collect(),
                Stage::Substitution(simplifier) => current
                    .into_iter()
                    .filter_map(|model| {
                        if model.is_equipment_attached() {
                            simplifier.substitute(model, network, report)
                        } else {
                            Some(model)
                        }
                    })
                    .collect(),
            };
        }
        current
    }
}

impl std::fmt::Debug for SimplifierChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self
            .stages
            .iter()
            .map(|s| match s {
                Stage::Removal(r) => r.name(),
                Stage::Substitution(s) => s.name(),
            })
            .collect();
        f.debug_struct("SimplifierChain").field("stages", &names).finish()
    }
}

/// Drops models whose equipment is not energized: every terminal must be
/// connected and every hosting bus must carry a defined voltage.
pub struct Energized;

impl RemovalSimplifier for Energized {
    fn name(&self) -> &'static str {
        "energized"
    }

    fn should_keep(
        &self,
        model: &ModelDescriptor,
        network: &dyn Network,
        report: &mut AssemblyReport,
    ) -> bool {
        let Some(equipment_id) = model.equipment_id.as_deref() else {
            return true;
        };
        for (index, terminal) in network.terminals(equipment_id).iter().enumerate() {
            let side = index + 1;
            if !terminal.connected {
                report.warn(
                    WarningKind::SimplifierDropped,
                    &model.dynamic_id,
                    &model.library,
                    format!("terminal {side} of \"{equipment_id}\" is disconnected"),
                );
                return false;
            }
            let has_voltage = terminal
                .bus_id
                .as_deref()
                .is_some_and(|bus| network.bus_has_voltage(bus));
            if !has_voltage {
                report.warn(
                    WarningKind::SimplifierDropped,
                    &model.dynamic_id,
                    &model.library,
                    format!("bus of terminal {side} of \"{equipment_id}\" has no voltage"),
                );
                return false;
            }
        }
        true
    }
}

/// Drops models with no terminal in the main connected component.
pub struct MainComponent;

impl RemovalSimplifier for MainComponent {
    fn name(&self) -> &'static str {
        "main_component"
    }

    fn should_keep(
        &self,
        model: &ModelDescriptor,
        network: &dyn Network,
        report: &mut AssemblyReport,
    ) -> bool {
        let Some(equipment_id) = model.equipment_id.as_deref() else {
            return true;
        };
        let terminals = network.terminals(equipment_id);
        if terminals.is_empty() {
            return true;
        }
        let reaches_main = terminals.iter().any(|t| {
            t.bus_id
                .as_deref()
                .is_some_and(|bus| network.in_main_component(bus))
        });
        if !reaches_main {
            report.warn(
                WarningKind::SimplifierDropped,
                &model.dynamic_id,
                &model.library,
                format!("no terminal of \"{equipment_id}\" reaches the main component"),
            );
        }
        reaches_main
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{EquipmentKind, StaticNetwork, Terminal};

    fn network() -> StaticNetwork {
        let mut net = StaticNetwork::new("test");
        net.add_bus("B1", true, true);
        net.add_bus("B2", false, true);
        net.add_bus("B3", true, false);
        net.add_equipment("G1", EquipmentKind::Generator, vec![Terminal::connected("B1")]);
        net.add_equipment("G2", EquipmentKind::Generator, vec![Terminal::disconnected()]);
        net.add_equipment("G3", EquipmentKind::Generator, vec![Terminal::connected("B2")]);
        net.add_equipment(
            "LN1",
            EquipmentKind::Line,
            vec![Terminal::connected("B3"), Terminal::connected("B3")],
        );
        net
    }

    fn model_on(id: &str, equipment: &str) -> ModelDescriptor {
        ModelDescriptor::for_equipment(id, "TestLib", equipment)
    }

    #[test]
    fn energized_distinguishes_its_two_failure_modes() {
        let net = network();
        let mut report = AssemblyReport::new();
        let kept = SimplifierChain::builtin().apply(
            vec![model_on("g1", "G1"), model_on("g2", "G2"), model_on("g3", "G3")],
            &net,
            &mut report,
        );
        let ids: Vec<_> = kept.iter().map(|m| m.dynamic_id.as_str()).collect();
        assert_eq!(ids, vec!["g1"]);

        let details: Vec<_> = report.warnings().iter().map(|w| w.detail.as_str()).collect();
        assert!(details[0].contains("is disconnected"));
        assert!(details[1].contains("has no voltage"));
    }

    #[test]
    fn main_component_needs_only_one_reaching_terminal() {
        let mut net = network();
        net.add_equipment(
            "LN2",
            EquipmentKind::Line,
            vec![Terminal::connected("B3"), Terminal::connected("B1")],
        );
        let mut report = AssemblyReport::new();
        let mut chain = SimplifierChain::empty();
        chain.push_removal(Box::new(MainComponent));

        let kept = chain.apply(
            vec![model_on("ln1", "LN1"), model_on("ln2", "LN2")],
            &net,
            &mut report,
        );
        let ids: Vec<_> = kept.iter().map(|m| m.dynamic_id.as_str()).collect();
        assert_eq!(ids, vec!["ln2"]);
        assert!(report.warnings()[0].detail.contains("main component"));
    }

    #[test]
    fn pure_models_pass_through() {
        let net = network();
        let mut report = AssemblyReport::new();
        let kept = SimplifierChain::builtin().apply(
            vec![ModelDescriptor::new("automaton", "CurrentLimit")],
            &net,
            &mut report,
        );
        assert_eq!(kept.len(), 1);
        assert!(report.is_clean());
    }

    #[test]
    fn substitution_rewrites_in_place() {
        struct Downgrade;
        impl SubstitutionSimplifier for Downgrade {
            fn name(&self) -> &'static str {
                "downgrade"
            }
            fn substitute(
                &self,
                mut model: ModelDescriptor,
                _network: &dyn Network,
                report: &mut AssemblyReport,
            ) -> Option<ModelDescriptor> {
                if model.library == "Detailed" {
                    model.library = "Simplified".to_string();
                    return Some(model);
                }
                report.warn(
                    WarningKind::SimplifierDropped,
                    &model.dynamic_id,
                    &model.library,
                    "no simplified form".to_string(),
                );
                None
            }
        }

        let net = network();
        let mut report = AssemblyReport::new();
        let mut chain = SimplifierChain::empty();
        chain.push_substitution(Box::new(Downgrade));

        let mut detailed = model_on("g1", "G1");
        detailed.library = "Detailed".to_string();
        let kept = chain.apply(vec![detailed, model_on("g3", "G3")], &net, &mut report);

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].library, "Simplified");
        assert_eq!(report.warnings()[0].detail, "no simplified form");
    }

    #[test]
    fn stages_run_in_registration_order() {
        struct KeepNothing;
        impl RemovalSimplifier for KeepNothing {
            fn name(&self) -> &'static str {
                "keep_nothing"
            }
            fn should_keep(
                &self,
                model: &ModelDescriptor,
                _network: &dyn Network,
                report: &mut AssemblyReport,
            ) -> bool {
                report.warn(
                    WarningKind::SimplifierDropped,
                    &model.dynamic_id,
                    &model.library,
                    "vetoed".to_string(),
                );
                false
            }
        }

        let net = network();
        let mut report = AssemblyReport::new();
        let mut chain = SimplifierChain::builtin();
        chain.push_removal(Box::new(KeepNothing));

        // g2 falls to the energization stage first, so only g1 reaches the
        // final veto.
        let kept = chain.apply(vec![model_on("g1", "G1"), model_on("g2", "G2")], &net, &mut report);
        assert!(kept.is_empty());
        assert_eq!(report.warnings()[1].detail, "vetoed");
        assert_eq!(report.warnings()[1].id, "g1");
    }
}
