//! Macro-connection resolution against the model registry.
//!
//! Every accepted model (and every surviving event) declares connection
//! requests. Resolution turns them into three output tables: deduplicated
//! [`MacroConnector`] templates, one [`MacroConnect`] per request wired to
//! its resolved instance, and one [`StaticReference`] per library tag.

use indexmap::IndexMap;

use crate::error::AssemblyError;
use crate::model::{
    ConnectionRequest, EventDescriptor, ModelDescriptor, ModelRegistry, TargetRef, VarMapping,
    NETWORK_ID,
};
use crate::network::Network;
use crate::params::ParameterBank;
use crate::report::{AssemblyReport, WarningKind};

/// What to do when a connection target resolves to no accepted model.
///
/// Models that require companions ignore the policy and always fail, since
/// running them half-wired is never meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnresolvedPolicy {
    /// Drop the single connection with a warning and keep assembling.
    #[default]
    Warn,
    /// Abort the assembly.
    Fail,
}

/// A named, reusable variable-mapping template.
///
/// The name is the identity: two requests naming the same connector carry
/// the same mappings, so the first registration wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroConnector {
    pub name: String,
    pub mappings: Vec<VarMapping>,
}

impl MacroConnector {
    pub fn new(name: &str, mappings: Vec<VarMapping>) -> Self {
        MacroConnector {
            name: name.to_string(),
            mappings,
        }
    }
}

/// One instantiation of a macro connector between two resolved instance ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroConnect {
    pub connector: String,
    /// Dynamic id of the requesting descriptor.
    pub from: String,
    /// Dynamic id of the resolved target model.
    pub to: String,
}

/// Dynamic-to-network variable exposure for one library tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticReference {
    pub library: String,
    pub mappings: Vec<VarMapping>,
}

/// The three connection tables produced for one stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedConnections {
    pub connectors: Vec<MacroConnector>,
    pub connects: Vec<MacroConnect>,
    pub static_refs: Vec<StaticReference>,
}

/// Accumulates connection state for one stage.
///
/// Each stage gets a fresh resolver: connector and static-reference
/// deduplication never leaks across stage boundaries.
#[derive(Debug, Default)]
pub struct ConnectionResolver {
    connectors: IndexMap<String, MacroConnector>,
    connects: Vec<MacroConnect>,
    static_refs: IndexMap<String, StaticReference>,
}

impl ConnectionResolver {
    pub fn new() -> Self {
        ConnectionResolver::default()
    }

    /// Registers a model's static references and resolves its connection
    /// requests.
    ///
    /// # Errors
    ///
    /// [`AssemblyError::UnresolvedTarget`] when a target resolves to nothing
    /// and either `policy` is [`UnresolvedPolicy::Fail`] or the model
    /// requires companions.
    pub fn add_model(
        &mut self,
        model: &ModelDescriptor,
        registry: &ModelRegistry<'_>,
        policy: UnresolvedPolicy,
        report: &mut AssemblyReport,
    ) -> Result<(), AssemblyError> {
        if !model.static_vars.is_empty() {
            self.static_refs
                .entry(model.library.clone())
                .or_insert_with(|| StaticReference {
                    library: model.library.clone(),
                    mappings: model.static_vars.clone(),
                });
        }
        let strict = model.capabilities.requires_companions;
        for request in &model.connections {
            self.add_request(
                &model.dynamic_id,
                &model.library,
                request,
                registry,
                policy,
                strict,
                report,
            )?;
        }
        Ok(())
    }

    /// Wires an event into its late-bound target and collects its default
    /// parameters. Returns whether the event made it into the output.
    ///
    /// Events whose equipment is unknown or disconnected are skipped with a
    /// warning and contribute nothing.
    ///
    /// # Errors
    ///
    /// [`AssemblyError::DanglingEventTarget`] when the event asks to open a
    /// side that can never be opened, whatever the connection state.
    pub fn add_event(
        &mut self,
        event: &EventDescriptor,
        registry: &ModelRegistry<'_>,
        network: &dyn Network,
        policy: UnresolvedPolicy,
        params: &mut ParameterBank,
        report: &mut AssemblyReport,
    ) -> Result<bool, AssemblyError> {
        check_dangling(event, network)?;

        let modeled = registry.equipment(&event.equipment_id).is_some();
        let known = network.equipment_kind(&event.equipment_id).is_some();
        if !modeled && !known {
            report.warn(
                WarningKind::EventSkipped,
                &event.dynamic_id,
                &event.library,
                format!("target \"{}\" is not in the network", event.equipment_id),
            );
            return Ok(false);
        }
        if known && !network.is_fully_connected(&event.equipment_id) {
            report.warn(
                WarningKind::EventSkipped,
                &event.dynamic_id,
                &event.library,
                format!("target \"{}\" is disconnected", event.equipment_id),
            );
            return Ok(false);
        }

        for request in event.requests(registry) {
            self.add_request(
                &event.dynamic_id,
                &event.library,
                &request,
                registry,
                policy,
                false,
                report,
            )?;
        }
        params.insert(event.default_parameters());
        Ok(true)
    }

    #[expect(clippy::too_many_arguments)]
    fn add_request(
        &mut self,
        owner_id: &str,
        owner_library: &str,
        request: &ConnectionRequest,
        registry: &ModelRegistry<'_>,
        policy: UnresolvedPolicy,
        strict: bool,
        report: &mut AssemblyReport,
    ) -> Result<(), AssemblyError> {
        let resolved = match &request.target {
            // The implicit network model answers to everything attached to
            // the grid, so it always resolves.
            TargetRef::Pure(id) if id == NETWORK_ID => Some(NETWORK_ID),
            target => registry.resolve(target).map(|m| m.dynamic_id.as_str()),
        };

        let Some(target_id) = resolved else {
            if strict || policy == UnresolvedPolicy::Fail {
                return Err(AssemblyError::UnresolvedTarget {
                    model_id: owner_id.to_string(),
                    connector: request.connector.clone(),
                    target: request.target.id().to_string(),
                });
            }
            report.warn(
                WarningKind::UnresolvedTarget,
                owner_id,
                owner_library,
                format!(
                    "target \"{}\" resolves to no accepted model; connection dropped",
                    request.target.id()
                ),
            );
            return Ok(());
        };

        self.connectors
            .entry(request.connector.clone())
            .or_insert_with(|| MacroConnector::new(&request.connector, request.mappings.clone()));
        self.connects.push(MacroConnect {
            connector: request.connector.clone(),
            from: owner_id.to_string(),
            to: target_id.to_string(),
        });
        Ok(())
    }

    pub fn finish(self) -> ResolvedConnections {
        ResolvedConnections {
            connectors: self.connectors.into_values().collect(),
            connects: self.connects,
            static_refs: self.static_refs.into_values().collect(),
        }
    }
}

fn check_dangling(event: &EventDescriptor, network: &dyn Network) -> Result<(), AssemblyError> {
    let Some(sides) = event.kind.targeted_sides() else {
        return Ok(());
    };
    let terminals = network.terminals(&event.equipment_id);
    if terminals.is_empty() {
        return Ok(());
    }
    let dangling_side = if sides.is_empty() {
        terminals
            .iter()
            .position(|t| t.dangling)
            .map(|index| (index + 1) as u8)
    } else {
        sides.iter().copied().find(|&side| {
            (side as usize)
                .checked_sub(1)
                .and_then(|index| terminals.get(index))
                .is_some_and(|t| t.dangling)
        })
    };
    match dangling_side {
        Some(side) => Err(AssemblyError::DanglingEventTarget {
            event_id: event.dynamic_id.clone(),
            equipment_id: event.equipment_id.clone(),
            side,
        }),
        None => Ok(()),
    }
}
