//! Event model declarations and their late-bound connection requests.

use crate::model::registry::{ModelRegistry, NETWORK_ID};
use crate::model::types::{ConnectionRequest, Descriptor, TargetRef, VarMapping};
use crate::params::{ParamValue, ParametersSet};
use crate::version::VersionInterval;

/// Library tag of equipment-disconnection events.
pub const DISCONNECTION_LIBRARY: &str = "EventDisconnection";
/// Library tag of active-power step events.
pub const POWER_VARIATION_LIBRARY: &str = "EventPowerVariation";

/// The perturbation an event applies at its start time.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// Opens the listed 1-based terminal sides of the target equipment; an
    /// empty list opens every side.
    Disconnection { sides: Vec<u8> },
    /// Steps the target's active power by `delta_p` megawatts.
    PowerVariation { delta_p: f64 },
}

impl EventKind {
    /// Sides the event acts on, when side semantics apply.
    pub fn targeted_sides(&self) -> Option<&[u8]> {
        match self {
            EventKind::Disconnection { sides } => Some(sides),
            EventKind::PowerVariation { .. } => None,
        }
    }
}

/// A time-triggered perturbation of one grid element.
///
/// Events pass the same uniqueness and version gates as models but never
/// attach to equipment the way models do: they *wire into* whichever model
/// ends up bound to their target, which is only known once the registry is
/// built.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDescriptor {
    pub dynamic_id: String,
    pub library: String,
    pub version: VersionInterval,
    /// Id of the grid element the event perturbs.
    pub equipment_id: String,
    /// Simulation time, in seconds, at which the event fires.
    pub start_time: f64,
    pub kind: EventKind,
}

impl EventDescriptor {
    pub fn disconnection(dynamic_id: &str, equipment_id: &str, start_time: f64, sides: Vec<u8>) -> Self {
        EventDescriptor {
            dynamic_id: dynamic_id.to_string(),
            library: DISCONNECTION_LIBRARY.to_string(),
            version: VersionInterval::default(),
            equipment_id: equipment_id.to_string(),
            start_time,
            kind: EventKind::Disconnection { sides },
        }
    }

    pub fn power_variation(dynamic_id: &str, equipment_id: &str, start_time: f64, delta_p: f64) -> Self {
        EventDescriptor {
            dynamic_id: dynamic_id.to_string(),
            library: POWER_VARIATION_LIBRARY.to_string(),
            version: VersionInterval::default(),
            equipment_id: equipment_id.to_string(),
            start_time,
            kind: EventKind::PowerVariation { delta_p },
        }
    }

    /// Connection requests, resolved against the built registry.
    ///
    /// When the target equipment carries a model, the event wires into that
    /// model's library-specific variables. Otherwise it falls back to the
    /// implicit network model, with the network-side variables qualified by
    /// the equipment id; the connector name carries the equipment id too so
    /// that equal names keep meaning equal mappings.
    pub fn requests(&self, registry: &ModelRegistry<'_>) -> Vec<ConnectionRequest> {
        match registry.equipment(&self.equipment_id) {
            Some(model) => {
                let connector = format!(
                    "{}To{}{}",
                    self.library,
                    model.library,
                    self.side_suffix()
                );
                vec![ConnectionRequest::new(
                    &connector,
                    self.model_mappings(),
                    TargetRef::Equipment(self.equipment_id.clone()),
                )]
            }
            None => {
                let connector =
                    format!("{}ToNetwork_{}", self.library, self.equipment_id);
                vec![ConnectionRequest::new(
                    &connector,
                    self.network_mappings(),
                    TargetRef::Pure(NETWORK_ID.to_string()),
                )]
            }
        }
    }

    /// Default parameter set, keyed by the event's dynamic id.
    pub fn default_parameters(&self) -> ParametersSet {
        let set = ParametersSet::new(&self.dynamic_id)
            .with("event_t_event", ParamValue::Number(self.start_time));
        match &self.kind {
            EventKind::Disconnection { sides } if sides.is_empty() => {
                set.with("event_disconnect_all", ParamValue::Bool(true))
            }
            EventKind::Disconnection { sides } => sides.iter().fold(set, |set, side| {
                set.with(&format!("event_disconnect_side_{side}"), ParamValue::Bool(true))
            }),
            EventKind::PowerVariation { delta_p } => {
                set.with("event_delta_p", ParamValue::Number(*delta_p))
            }
        }
    }

    fn side_suffix(&self) -> String {
        match &self.kind {
            EventKind::Disconnection { sides } if !sides.is_empty() => {
                let joined: Vec<String> = sides.iter().map(u8::to_string).collect();
                format!("Side{}", joined.join("_"))
            }
            _ => String::new(),
        }
    }

    fn model_mappings(&self) -> Vec<VarMapping> {
        match &self.kind {
            EventKind::Disconnection { sides } if sides.is_empty() => {
                vec![VarMapping::new("event_state1_value", "switch_off_signal_value")]
            }
            EventKind::Disconnection { sides } => sides
                .iter()
                .map(|side| {
                    VarMapping::new(
                        &format!("event_state{side}_value"),
                        &format!("switch_off_signal{side}_value"),
                    )
                })
                .collect(),
            EventKind::PowerVariation { .. } => {
                vec![VarMapping::new("event_delta_p_value", "active_power_setpoint_value")]
            }
        }
    }

    fn network_mappings(&self) -> Vec<VarMapping> {
        let eq = &self.equipment_id;
        match &self.kind {
            EventKind::Disconnection { sides } if sides.is_empty() => {
                vec![VarMapping::new("event_state1_value", &format!("{eq}_state_value"))]
            }
            EventKind::Disconnection { sides } => sides
                .iter()
                .map(|side| {
                    VarMapping::new(
                        &format!("event_state{side}_value"),
                        &format!("{eq}_state{side}_value"),
                    )
                })
                .collect(),
            EventKind::PowerVariation { .. } => {
                vec![VarMapping::new("event_delta_p_value", &format!("{eq}_p_value"))]
            }
        }
    }
}

impl Descriptor for EventDescriptor {
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
