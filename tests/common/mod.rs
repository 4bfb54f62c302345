//! Shared test fixtures for integration tests.

use dynsim_assembly::model::{EventDescriptor, ModelDescriptor, VarMapping};
use dynsim_assembly::network::{EquipmentKind, StaticNetwork, Terminal};
use dynsim_assembly::pipeline::{AssemblySettings, SimulationWindow};
use dynsim_assembly::version::VersionTag;

/// Default two-bus network: generators on each bus, a load on B1, and a
/// tie line between the buses.
pub fn default_network() -> StaticNetwork {
    let mut net = StaticNetwork::new("testgrid");
    net.add_bus("B1", true, true);
    net.add_bus("B2", true, true);
    net.add_equipment("G1", EquipmentKind::Generator, vec![Terminal::connected("B1")]);
    net.add_equipment("G2", EquipmentKind::Generator, vec![Terminal::connected("B2")]);
    net.add_equipment("LD1", EquipmentKind::Load, vec![Terminal::connected("B1")]);
    net.add_equipment(
        "LN1",
        EquipmentKind::Line,
        vec![Terminal::connected("B1"), Terminal::connected("B2")],
    );
    net
}

/// Default assembler settings (engine 1.3, window [0, 100), 50 Hz).
pub fn default_settings() -> AssemblySettings {
    AssemblySettings::new(VersionTag::new(1, 3), SimulationWindow::new(0.0, 100.0))
}

/// Frequency-synchronized generator model with one exposed static variable.
pub fn gen_model(id: &str, equipment: &str) -> ModelDescriptor {
    let mut m = ModelDescriptor::for_equipment(id, "GeneratorFourWindings", equipment);
    m.capabilities.frequency_synchronized = true;
    m.static_vars.push(VarMapping::new("generator_p_pu", "p"));
    m
}

/// Signal-N generator model.
pub fn signal_model(id: &str, equipment: &str) -> ModelDescriptor {
    let mut m = ModelDescriptor::for_equipment(id, "GeneratorPVSignalN", equipment);
    m.capabilities.signal_n = true;
    m.static_vars.push(VarMapping::new("generator_p_pu", "p"));
    m
}

/// Plain load model with no synchronization capability.
pub fn load_model(id: &str, equipment: &str) -> ModelDescriptor {
    let mut m = ModelDescriptor::for_equipment(id, "LoadAlphaBeta", equipment);
    m.static_vars.push(VarMapping::new("load_p_pu", "p"));
    m
}

/// Full-equipment disconnection event.
pub fn trip_event(id: &str, equipment: &str, start_time: f64) -> EventDescriptor {
    EventDescriptor::disconnection(id, equipment, start_time, vec![])
}
