//! End-to-end orchestration: filters, simplifiers, synchronizer selection,
//! connection resolution and stage assembly.

use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;

use crate::error::AssemblyError;
use crate::model::{EventDescriptor, ModelDescriptor, ModelRegistry};
use crate::network::{EquipmentKind, Network};
use crate::params::{ParameterBank, ParametersSet};
use crate::pipeline::connections::{ConnectionResolver, UnresolvedPolicy};
use crate::pipeline::filters::{retain_supported, retain_unique};
use crate::pipeline::simplifiers::SimplifierChain;
use crate::pipeline::stages::{
    split_models, SimulationWindow, StageBundle, StagePartition, PRIMARY_STAGE, STAGED_STAGE,
};
use crate::pipeline::synchronizer;
use crate::report::{AssemblyReport, WarningKind};
use crate::version::VersionTag;

/// Run-level settings consumed by the assembler.
#[derive(Debug, Clone)]
pub struct AssemblySettings {
    /// Version of the engine the output is meant for.
    pub engine_version: VersionTag,
    /// Window of the primary stage.
    pub window: SimulationWindow,
    /// Whether the simplifier chain runs at all.
    pub use_simplifiers: bool,
    pub unresolved_policy: UnresolvedPolicy,
    /// Nominal grid frequency handed to the default synchronizer strategy.
    pub frequency_hz: f64,
}

impl AssemblySettings {
    pub fn new(engine_version: VersionTag, window: SimulationWindow) -> Self {
        AssemblySettings {
            engine_version,
            window,
            use_simplifiers: false,
            unresolved_policy: UnresolvedPolicy::Warn,
            frequency_hz: 50.0,
        }
    }
}

/// The assembly pipeline, configured once and run per input set.
pub struct Assembler {
    settings: AssemblySettings,
    simplifiers: SimplifierChain,
    partition: Option<StagePartition>,
}

impl Assembler {
    /// Assembler with the built-in simplifier chain and no stage partition.
    pub fn new(settings: AssemblySettings) -> Self {
        Assembler {
            settings,
            simplifiers: SimplifierChain::builtin(),
            partition: None,
        }
    }

    /// Replaces the simplifier chain. The chain still only runs when
    /// [`AssemblySettings::use_simplifiers`] is set.
    pub fn with_simplifiers(mut self, simplifiers: SimplifierChain) -> Self {
        self.simplifiers = simplifiers;
        self
    }

    /// Enables the staged phase.
    pub fn with_partition(mut self, partition: StagePartition) -> Self {
        self.partition = Some(partition);
        self
    }

    /// Runs the whole pipeline over one input set.
    ///
    /// # Errors
    ///
    /// Returns the first [`AssemblyError`] encountered; recoverable problems
    /// land in the returned report instead.
    ///
    /// # Panics
    ///
    /// Panics when a stage partition is supplied whose stop time does not
    /// extend past the primary window.
    pub fn assemble(
        &self,
        models: Vec<ModelDescriptor>,
        events: Vec<EventDescriptor>,
        network: &dyn Network,
    ) -> Result<Assembly, AssemblyError> {
        let mut report = AssemblyReport::new();
        let mut seen = HashSet::new();
        let declared_models = models.len();
        let declared_events = events.len();

        let models = retain_unique(models, &mut seen, &mut report);
        let mut models = retain_supported(models, &self.settings.engine_version, &mut report);
        if self.settings.use_simplifiers {
            models = self.simplifiers.apply(models, network, &mut report);
        }
        if let Some(sync) = synchronizer::synthesize(&models, network, self.settings.frequency_hz)? {
            // The synthesized id lives in the same namespace as declared
            // ones; a declaration that already claimed it wins.
            if seen.insert(sync.dynamic_id.clone()) {
                tracing::debug!(library = %sync.library, "synthesized synchronizer");
                models.push(sync);
            } else {
                report.warn(
                    WarningKind::DuplicateId,
                    &sync.dynamic_id,
                    &sync.library,
                    "dynamic id already declared; synthesized synchronizer dropped".to_string(),
                );
            }
        }
        check_default_coverage(&models, network)?;

        // Events pass the same gates, sharing the seen-id set with models.
        let events = retain_unique(events, &mut seen, &mut report);
        let events = retain_supported(events, &self.settings.engine_version, &mut report);
        tracing::debug!(
            models = models.len(),
            declared_models,
            events = events.len(),
            declared_events,
            "acceptance complete"
        );

        // Inline parameters are banked in acceptance order, before the model
        // list is split across stages.
        let mut parameters = ParameterBank::new();
        for model in &models {
            if !model.parameters.is_empty() {
                parameters.insert(ParametersSet {
                    id: model.parameter_set_id.clone(),
                    entries: model.parameters.clone(),
                });
            }
        }

        let (primary, staged) = split_models(models, self.partition.as_ref());
        // Both stages resolve against the full registry; only connector and
        // static-reference bookkeeping restarts per stage.
        let registry = ModelRegistry::index(&primary).merge(ModelRegistry::index(&staged));
        let policy = self.settings.unresolved_policy;

        let mut resolver = ConnectionResolver::new();
        for model in &primary {
            resolver.add_model(model, &registry, policy, &mut report)?;
        }
        // Skipped events stay out of the stage bundle entirely.
        let mut kept_events = Vec::with_capacity(events.len());
        for event in events {
            if resolver.add_event(&event, &registry, network, policy, &mut parameters, &mut report)? {
                kept_events.push(event);
            }
        }
        let primary_connections = resolver.finish();

        let staged_connections = match self.partition {
            Some(_) => {
                let mut resolver = ConnectionResolver::new();
                for model in &staged {
                    resolver.add_model(model, &registry, policy, &mut report)?;
                }
                Some(resolver.finish())
            }
            None => None,
        };
        drop(registry);

        let mut stages = vec![StageBundle {
            name: PRIMARY_STAGE,
            window: self.settings.window,
            models: primary,
            events: kept_events,
            connections: primary_connections,
        }];
        if let (Some(partition), Some(connections)) = (&self.partition, staged_connections) {
            // The staged phase exists whenever a partition is supplied, even
            // if no model matched it.
            stages.push(StageBundle {
                name: STAGED_STAGE,
                window: SimulationWindow::new(self.settings.window.stop, partition.stop_time()),
                models: staged,
                events: Vec::new(),
                connections,
            });
        }

        Ok(Assembly {
            stages,
            parameters,
            report,
        })
    }
}

/// Enforces the explicit-coverage rule: once any accepted model forbids
/// defaults for an equipment kind, every element of that kind must carry an
/// explicit model.
fn check_default_coverage(
    models: &[ModelDescriptor],
    network: &dyn Network,
) -> Result<(), AssemblyError> {
    let mut governed: IndexMap<EquipmentKind, &str> = IndexMap::new();
    for model in models {
        for kind in &model.capabilities.forbids_defaults {
            governed.entry(*kind).or_insert(&model.dynamic_id);
        }
    }
    if governed.is_empty() {
        return Ok(());
    }
    let covered: HashSet<&str> = models
        .iter()
        .filter_map(|m| m.equipment_id.as_deref())
        .collect();
    for (kind, model_id) in governed {
        let missing: Vec<String> = network
            .equipment_of_kind(kind)
            .into_iter()
            .filter(|id| !covered.contains(id))
            .map(String::from)
            .collect();
        if !missing.is_empty() {
            return Err(AssemblyError::MissingExplicitModels {
                model_id: model_id.to_string(),
                kind: kind.label().to_string(),
                missing,
            });
        }
    }
    Ok(())
}

/// Validated, cross-referenced output of one assembly run.
#[derive(Debug)]
pub struct Assembly {
    /// Stage bundles in execution order; the primary stage always exists.
    pub stages: Vec<StageBundle>,
    pub parameters: ParameterBank,
    pub report: AssemblyReport,
}

impl Assembly {
    pub fn primary(&self) -> &StageBundle {
        &self.stages[0]
    }

    pub fn model_count(&self) -> usize {
        self.stages.iter().map(|s| s.models.len()).sum()
    }
}

impl fmt::Display for Assembly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Assembly Summary ---")?;
        for stage in &self.stages {
            writeln!(
                f,
                "stage {:<8} {} models, {} events, {} connectors, {} connects, {} static refs, window {}",
                format!("{}:", stage.name),
                stage.models.len(),
                stage.events.len(),
                stage.connections.connectors.len(),
                stage.connections.connects.len(),
                stage.connections.static_refs.len(),
                stage.window,
            )?;
        }
        writeln!(f, "parameter sets: {}", self.parameters.len())?;
        write!(f, "warnings:       {}", self.report.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{StaticNetwork, Terminal};

    fn network() -> StaticNetwork {
        let mut net = StaticNetwork::new("unit");
        net.add_bus("B1", true, true);
        net.add_equipment("G1", EquipmentKind::Generator, vec![Terminal::connected("B1")]);
        net.add_equipment("G2", EquipmentKind::Generator, vec![Terminal::connected("B1")]);
        net.add_equipment("LD1", EquipmentKind::Load, vec![Terminal::connected("B1")]);
        net
    }

    fn settings() -> AssemblySettings {
        AssemblySettings::new(VersionTag::new(1, 3), SimulationWindow::new(0.0, 100.0))
    }

    #[test]
    fn empty_input_produces_one_clean_primary_stage() {
        let assembly = Assembler::new(settings())
            .assemble(Vec::new(), Vec::new(), &network())
            .unwrap();
        assert_eq!(assembly.stages.len(), 1);
        assert_eq!(assembly.stages[0].name, PRIMARY_STAGE);
        assert!(assembly.stages[0].models.is_empty());
        assert!(assembly.report.is_clean());
    }

    #[test]
    fn coverage_rule_fails_on_unmodeled_equipment_of_governed_kind() {
        let mut strict = ModelDescriptor::for_equipment("g1", "GeneratorFourWindings", "G1");
        strict.capabilities.forbids_defaults = vec![EquipmentKind::Generator];

        let err = Assembler::new(settings())
            .assemble(vec![strict.clone()], Vec::new(), &network())
            .unwrap_err();
        match err {
            AssemblyError::MissingExplicitModels { model_id, kind, missing } => {
                assert_eq!(model_id, "g1");
                assert_eq!(kind, "generator");
                assert_eq!(missing, vec!["G2"]);
            }
            other => panic!("unexpected error: {other}"),
        }

        // Covering G2 with any explicit model satisfies the rule.
        let other = ModelDescriptor::for_equipment("g2", "GeneratorPV", "G2");
        let assembly = Assembler::new(settings())
            .assemble(vec![strict, other], Vec::new(), &network())
            .unwrap();
        assert_eq!(assembly.model_count(), 2);
    }

    #[test]
    fn coverage_rule_ignores_ungoverned_kinds() {
        let mut strict = ModelDescriptor::for_equipment("g1", "GeneratorFourWindings", "G1");
        strict.capabilities.forbids_defaults = vec![EquipmentKind::Generator];
        let other = ModelDescriptor::for_equipment("g2", "GeneratorPV", "G2");
        // LD1 has no model, but loads are not governed.
        let assembly = Assembler::new(settings())
            .assemble(vec![strict, other], Vec::new(), &network())
            .unwrap();
        assert!(assembly.report.is_clean());
    }

    #[test]
    fn display_summarizes_stages() {
        let models = vec![ModelDescriptor::for_equipment("g1", "GeneratorPV", "G1")];
        let assembly = Assembler::new(settings())
            .assemble(models, Vec::new(), &network())
            .unwrap();
        let text = assembly.to_string();
        assert!(text.contains("--- Assembly Summary ---"));
        assert!(text.contains("stage primary:"));
        assert!(text.contains("window [0, 100)s"));
    }
}
