//! In-memory network used by the demo binary and the test suites.

use indexmap::IndexMap;

use crate::network::types::{EquipmentKind, Network, Terminal};

/// Per-bus flags consumed by the topology simplifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bus {
    pub voltage_defined: bool,
    pub main_component: bool,
}

#[derive(Debug, Clone)]
struct Element {
    kind: EquipmentKind,
    terminals: Vec<Terminal>,
}

/// A fixed snapshot of grid topology.
///
/// Buses and equipment are stored in insertion order so enumeration (and
/// therefore every downstream diagnostic) is deterministic.
#[derive(Debug, Clone, Default)]
pub struct StaticNetwork {
    name: String,
    buses: IndexMap<String, Bus>,
    elements: IndexMap<String, Element>,
}

impl StaticNetwork {
    pub fn new(name: &str) -> Self {
        StaticNetwork {
            name: name.to_string(),
            buses: IndexMap::new(),
            elements: IndexMap::new(),
        }
    }

    /// Registers a bus. Re-adding an id overwrites its flags.
    pub fn add_bus(&mut self, id: &str, voltage_defined: bool, main_component: bool) {
        self.buses.insert(
            id.to_string(),
            Bus {
                voltage_defined,
                main_component,
            },
        );
    }

    /// Registers an equipment element with its terminals in side order.
    pub fn add_equipment(&mut self, id: &str, kind: EquipmentKind, terminals: Vec<Terminal>) {
        self.elements.insert(id.to_string(), Element { kind, terminals });
    }

    pub fn bus(&self, id: &str) -> Option<&Bus> {
        self.buses.get(id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl Network for StaticNetwork {
    fn name(&self) -> &str {
        &self.name
    }

    fn equipment_kind(&self, equipment_id: &str) -> Option<EquipmentKind> {
        self.elements.get(equipment_id).map(|e| e.kind)
    }

    fn terminals(&self, equipment_id: &str) -> &[Terminal] {
        self.elements
            .get(equipment_id)
            .map(|e| e.terminals.as_slice())
            .unwrap_or(&[])
    }

    fn bus_has_voltage(&self, bus_id: &str) -> bool {
        self.buses.get(bus_id).is_some_and(|b| b.voltage_defined)
    }

    fn in_main_component(&self, bus_id: &str) -> bool {
        self.buses.get(bus_id).is_some_and(|b| b.main_component)
    }

    fn equipment_of_kind(&self, kind: EquipmentKind) -> Vec<&str> {
        self.elements
            .iter()
            .filter(|(_, e)| e.kind == kind)
            .map(|(id, _)| id.as_str())
            .collect()
    }
}
