//! Read-only topology facts the assembly pipeline needs from a grid model.
//!
//! The pipeline never mutates the network and never walks topology beyond
//! per-equipment terminal state and per-bus flags, so the trait stays small.

use serde::Deserialize;

/// Kinds of grid equipment a dynamic model can attach to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentKind {
    Bus,
    Generator,
    Load,
    Line,
    Transformer,
    Shunt,
    StaticVarCompensator,
    HvdcLine,
}

impl EquipmentKind {
    /// Lowercase label used in diagnostics and scenario files.
    pub fn label(&self) -> &'static str {
        match self {
            EquipmentKind::Bus => "bus",
            EquipmentKind::Generator => "generator",
            EquipmentKind::Load => "load",
            EquipmentKind::Line => "line",
            EquipmentKind::Transformer => "transformer",
            EquipmentKind::Shunt => "shunt",
            EquipmentKind::StaticVarCompensator => "static_var_compensator",
            EquipmentKind::HvdcLine => "hvdc_line",
        }
    }
}

/// Connection state of one equipment terminal.
///
/// Multi-terminal equipment (lines, transformers) lists terminals in side
/// order; side numbers in event declarations are 1-based indexes into that
/// order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Terminal {
    /// Hosting bus, when the terminal is wired to one.
    pub bus_id: Option<String>,
    pub connected: bool,
    /// A dangling terminal is permanently wired (a boundary side) and can
    /// never be opened by an event.
    pub dangling: bool,
}

impl Terminal {
    pub fn connected(bus_id: &str) -> Self {
        Terminal {
            bus_id: Some(bus_id.to_string()),
            connected: true,
            dangling: false,
        }
    }

    pub fn disconnected() -> Self {
        Terminal {
            bus_id: None,
            connected: false,
            dangling: false,
        }
    }

    pub fn dangling(bus_id: &str) -> Self {
        Terminal {
            bus_id: Some(bus_id.to_string()),
            connected: true,
            dangling: true,
        }
    }
}

/// Topology queries the pipeline issues against the caller's grid model.
pub trait Network {
    /// Network identity, used to derive default parameter-set names.
    fn name(&self) -> &str;

    /// Kind of the named equipment, if the network knows it.
    fn equipment_kind(&self, equipment_id: &str) -> Option<EquipmentKind>;

    /// Terminals of the named equipment in side order; empty when unknown.
    fn terminals(&self, equipment_id: &str) -> &[Terminal];

    /// Whether the bus carries a defined voltage value.
    fn bus_has_voltage(&self, bus_id: &str) -> bool;

    /// Whether the bus belongs to the main connected component.
    fn in_main_component(&self, bus_id: &str) -> bool;

    /// Ids of every element of the given kind, in a stable order.
    fn equipment_of_kind(&self, kind: EquipmentKind) -> Vec<&str>;

    /// True when the equipment is known and every terminal is connected.
    fn is_fully_connected(&self, equipment_id: &str) -> bool {
        let terminals = self.terminals(equipment_id);
        !terminals.is_empty() && terminals.iter().all(|t| t.connected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_constructors() {
        let t = Terminal::connected("B1");
        assert_eq!(t.bus_id.as_deref(), Some("B1"));
        assert!(t.connected);
        assert!(!t.dangling);

        let t = Terminal::disconnected();
        assert!(t.bus_id.is_none());
        assert!(!t.connected);

        let t = Terminal::dangling("B2");
        assert!(t.connected);
        assert!(t.dangling);
    }

    #[test]
    fn kind_labels_are_lowercase() {
        assert_eq!(EquipmentKind::Generator.label(), "generator");
        assert_eq!(EquipmentKind::StaticVarCompensator.label(), "static_var_compensator");
    }
}
