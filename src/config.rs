//! TOML-based scenario configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::model::{
    ConnectionRequest, EventDescriptor, ModelDescriptor, TargetRef, VarMapping,
};
use crate::network::{EquipmentKind, StaticNetwork, Terminal};
use crate::params::{ParamValue, Parameter};
use crate::pipeline::{
    AssemblySettings, SimulationWindow, StagePartition, UnresolvedPolicy,
};
use crate::version::{VersionInterval, VersionTag};

/// Top-level scenario configuration parsed from TOML.
///
/// All scalar sections have defaults matching the baseline scenario. Load
/// from TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Target engine version and pipeline switches.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Simulation window and global parameters.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Optional staged-phase definition.
    #[serde(default)]
    pub stages: Option<StagesConfig>,
    /// Grid topology snapshot.
    #[serde(default)]
    pub network: NetworkConfig,
    /// Dynamic model declarations.
    #[serde(default)]
    pub models: Vec<ModelConfig>,
    /// Event declarations.
    #[serde(default)]
    pub events: Vec<EventConfig>,
}

/// Target engine version and pipeline switches.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Engine version the output is assembled for.
    pub version: String,
    /// Whether the topology simplifier chain runs.
    pub use_simplifiers: bool,
    /// Unresolved-target policy: `"warn"` or `"fail"`.
    pub unresolved_targets: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            version: "1.3.0".to_string(),
            use_simplifiers: false,
            unresolved_targets: "warn".to_string(),
        }
    }
}

/// Simulation window and global parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Window start (seconds, inclusive).
    pub start_time: f64,
    /// Window stop (seconds, exclusive).
    pub stop_time: f64,
    /// Nominal grid frequency (Hz).
    pub frequency_hz: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            start_time: 0.0,
            stop_time: 100.0,
            frequency_hz: 50.0,
        }
    }
}

/// Staged-phase definition: which models run late, and until when.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StagesConfig {
    /// Dynamic ids of the models moved to the staged phase.
    #[serde(default)]
    pub models: Vec<String>,
    /// Stop time of the staged phase (seconds, exclusive).
    pub stop_time: f64,
}

/// Grid topology snapshot.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkConfig {
    /// Network name, reused in derived parameter-set ids.
    pub name: String,
    pub buses: Vec<BusConfig>,
    pub equipment: Vec<EquipmentConfig>,
}

/// One bus and its simplifier-relevant flags.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BusConfig {
    pub id: String,
    #[serde(default = "default_true")]
    pub voltage_defined: bool,
    #[serde(default = "default_true")]
    pub main_component: bool,
}

/// One grid element with its terminals in side order.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EquipmentConfig {
    pub id: String,
    pub kind: EquipmentKind,
    pub terminals: Vec<TerminalConfig>,
}

/// One terminal of a grid element.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TerminalConfig {
    /// Hosting bus id, when wired.
    pub bus: Option<String>,
    pub connected: bool,
    pub dangling: bool,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            bus: None,
            connected: true,
            dangling: false,
        }
    }
}

/// One dynamic model declaration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    /// Dynamic id, unique across models and events.
    pub id: String,
    /// Library tag naming the behavioral implementation.
    pub library: String,
    /// Equipment binding; absent for pure models.
    #[serde(default)]
    pub equipment: Option<String>,
    /// Minimum supported engine version (inclusive).
    #[serde(default)]
    pub min_version: Option<String>,
    /// First engine version the model is retired from (exclusive bound).
    #[serde(default)]
    pub max_version: Option<String>,
    /// Note naming what replaced the model past `max_version`.
    #[serde(default)]
    pub end_cause: Option<String>,
    /// Parameter-set id; defaults to the dynamic id.
    #[serde(default)]
    pub parameter_set: Option<String>,
    #[serde(default)]
    pub frequency_synchronized: bool,
    #[serde(default)]
    pub signal_n: bool,
    #[serde(default)]
    pub synchronized_to_bus: bool,
    #[serde(default)]
    pub requires_companions: bool,
    /// Equipment kinds that must be fully covered by explicit models.
    #[serde(default)]
    pub forbids_defaults: Vec<EquipmentKind>,
    /// Dynamic-to-network variable exposure for the model's library.
    #[serde(default)]
    pub static_vars: Vec<VarMapping>,
    /// Inline parameter entries.
    #[serde(default)]
    pub parameters: Vec<ParamEntryConfig>,
    /// Declared connection requests.
    #[serde(default)]
    pub connections: Vec<ConnectionConfig>,
}

/// One inline parameter entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParamEntryConfig {
    pub name: String,
    /// Scalar TOML value: boolean, integer, float or string.
    pub value: toml::Value,
}

/// One declared connection request.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionConfig {
    /// Macro-connector template name.
    pub connector: String,
    /// Target by equipment identity. Exactly one of `to_equipment` and
    /// `to_model` must be set.
    #[serde(default)]
    pub to_equipment: Option<String>,
    /// Target by pure dynamic id.
    #[serde(default)]
    pub to_model: Option<String>,
    #[serde(default)]
    pub mappings: Vec<VarMapping>,
}

/// One event declaration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventConfig {
    /// Dynamic id, unique across models and events.
    pub id: String,
    /// Event kind: `"disconnection"` or `"power_variation"`.
    pub kind: String,
    /// Target equipment id.
    pub equipment: String,
    /// Trigger time (seconds).
    pub start_time: f64,
    /// Terminal sides to open (disconnection only, 1-based; empty = all).
    #[serde(default)]
    pub sides: Vec<u8>,
    /// Active-power step in MW (power_variation only).
    #[serde(default)]
    pub delta_p: Option<f64>,
    #[serde(default)]
    pub min_version: Option<String>,
    #[serde(default)]
    pub max_version: Option<String>,
    #[serde(default)]
    pub end_cause: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"engine.version"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {} — {}", self.field, self.message)
    }
}

impl ScenarioConfig {
    /// Returns the baseline scenario: a generator and a load on a two-bus
    /// grid, with a line-trip event on unmodeled equipment.
    pub fn baseline() -> Self {
        Self {
            engine: EngineConfig::default(),
            simulation: SimulationConfig::default(),
            stages: None,
            network: NetworkConfig {
                name: "twobus".to_string(),
                buses: vec![bus("B1"), bus("B2")],
                equipment: vec![
                    equipment("G1", EquipmentKind::Generator, &["B1"]),
                    equipment("LD1", EquipmentKind::Load, &["B1"]),
                    equipment("LN1", EquipmentKind::Line, &["B1", "B2"]),
                ],
            },
            models: vec![
                ModelConfig {
                    frequency_synchronized: true,
                    static_vars: vec![
                        VarMapping::new("generator_p_pu", "p"),
                        VarMapping::new("generator_q_pu", "q"),
                    ],
                    ..model("g1", "GeneratorFourWindings", Some("G1"))
                },
                ModelConfig {
                    static_vars: vec![VarMapping::new("load_p_pu", "p")],
                    ..model("ld1", "LoadAlphaBeta", Some("LD1"))
                },
            ],
            events: vec![EventConfig {
                id: "ev_line_trip".to_string(),
                kind: "disconnection".to_string(),
                equipment: "LN1".to_string(),
                start_time: 50.0,
                sides: vec![2],
                delta_p: None,
                min_version: None,
                max_version: None,
                end_cause: None,
            }],
        }
    }

    /// Returns the signal-N preset: every generator modeled with signal-N
    /// coordination and defaults forbidden for generators.
    pub fn signal_n() -> Self {
        let base = Self::baseline();
        Self {
            engine: EngineConfig {
                use_simplifiers: true,
                ..EngineConfig::default()
            },
            network: NetworkConfig {
                name: "signal_n_grid".to_string(),
                buses: vec![bus("B1"), bus("B2")],
                equipment: vec![
                    equipment("G1", EquipmentKind::Generator, &["B1"]),
                    equipment("G2", EquipmentKind::Generator, &["B2"]),
                    equipment("LD1", EquipmentKind::Load, &["B1"]),
                    equipment("LN1", EquipmentKind::Line, &["B1", "B2"]),
                ],
            },
            models: vec![
                ModelConfig {
                    signal_n: true,
                    forbids_defaults: vec![EquipmentKind::Generator],
                    static_vars: vec![VarMapping::new("generator_p_pu", "p")],
                    ..model("g1", "GeneratorPVSignalN", Some("G1"))
                },
                ModelConfig {
                    signal_n: true,
                    static_vars: vec![VarMapping::new("generator_p_pu", "p")],
                    ..model("g2", "GeneratorPVSignalN", Some("G2"))
                },
                ModelConfig {
                    static_vars: vec![VarMapping::new("load_p_pu", "p")],
                    ..model("ld1", "LoadAlphaBeta", Some("LD1"))
                },
            ],
            events: vec![EventConfig {
                id: "ev_load_step".to_string(),
                kind: "power_variation".to_string(),
                equipment: "LD1".to_string(),
                start_time: 30.0,
                sides: Vec::new(),
                delta_p: Some(-20.0),
                min_version: None,
                max_version: None,
                end_cause: None,
            }],
            ..base
        }
    }

    /// Returns the staged preset: baseline plus a load-shedding automaton
    /// deferred to a follow-on phase.
    pub fn staged() -> Self {
        let mut cfg = Self::baseline();
        cfg.stages = Some(StagesConfig {
            models: vec!["load_shed".to_string()],
            stop_time: 200.0,
        });
        cfg.models.push(ModelConfig {
            parameters: vec![ParamEntryConfig {
                name: "shed_fraction".to_string(),
                value: toml::Value::Float(0.2),
            }],
            connections: vec![ConnectionConfig {
                connector: "LoadShedAutomatonToLoadAlphaBeta".to_string(),
                to_equipment: Some("LD1".to_string()),
                to_model: None,
                mappings: vec![VarMapping::new("shed_level_value", "load_reduction_value")],
            }],
            ..model("load_shed", "LoadShedAutomaton", None)
        });
        cfg
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "signal_n", "staged"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "signal_n" => Ok(Self::signal_n()),
            "staged" => Ok(Self::staged()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "scenario".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid. Duplicate dynamic
    /// ids are deliberately not flagged here: the pipeline resolves them
    /// with a first-wins rule and a warning.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.engine.version.parse::<VersionTag>().is_err() {
            errors.push(ConfigError {
                field: "engine.version".into(),
                message: format!(
                    "must be 1 to 4 dot-separated numbers, got \"{}\"",
                    self.engine.version
                ),
            });
        }
        if self.engine.unresolved_targets != "warn" && self.engine.unresolved_targets != "fail" {
            errors.push(ConfigError {
                field: "engine.unresolved_targets".into(),
                message: format!(
                    "must be \"warn\" or \"fail\", got \"{}\"",
                    self.engine.unresolved_targets
                ),
            });
        }

        if self.simulation.start_time >= self.simulation.stop_time {
            errors.push(ConfigError {
                field: "simulation.start_time".into(),
                message: "must be < simulation.stop_time".into(),
            });
        }
        if self.simulation.frequency_hz <= 0.0 {
            errors.push(ConfigError {
                field: "simulation.frequency_hz".into(),
                message: "must be > 0".into(),
            });
        }

        if let Some(stages) = &self.stages {
            if stages.stop_time <= self.simulation.stop_time {
                errors.push(ConfigError {
                    field: "stages.stop_time".into(),
                    message: "must be > simulation.stop_time".into(),
                });
            }
            for id in &stages.models {
                if !self.models.iter().any(|m| &m.id == id) {
                    errors.push(ConfigError {
                        field: "stages.models".into(),
                        message: format!("\"{id}\" names no declared model"),
                    });
                }
            }
        }

        for equipment in &self.network.equipment {
            let field = format!("network.equipment.{}", equipment.id);
            if equipment.terminals.is_empty() {
                errors.push(ConfigError {
                    field: field.clone(),
                    message: "must declare at least one terminal".into(),
                });
            }
            for terminal in &equipment.terminals {
                if let Some(bus) = &terminal.bus {
                    if !self.network.buses.iter().any(|b| &b.id == bus) {
                        errors.push(ConfigError {
                            field: field.clone(),
                            message: format!("terminal references unknown bus \"{bus}\""),
                        });
                    }
                }
            }
        }

        for model in &self.models {
            let field = format!("models.{}", model.id);
            for version in [&model.min_version, &model.max_version].into_iter().flatten() {
                if version.parse::<VersionTag>().is_err() {
                    errors.push(ConfigError {
                        field: field.clone(),
                        message: format!("invalid version \"{version}\""),
                    });
                }
            }
            if let Some(equipment) = &model.equipment {
                if !self.network.equipment.iter().any(|e| &e.id == equipment) {
                    errors.push(ConfigError {
                        field: field.clone(),
                        message: format!("bound to unknown equipment \"{equipment}\""),
                    });
                }
            }
            for connection in &model.connections {
                if connection.to_equipment.is_some() == connection.to_model.is_some() {
                    errors.push(ConfigError {
                        field: field.clone(),
                        message: format!(
                            "connection \"{}\" must set exactly one of to_equipment and to_model",
                            connection.connector
                        ),
                    });
                }
            }
            for parameter in &model.parameters {
                if param_value(&parameter.value).is_err() {
                    errors.push(ConfigError {
                        field: field.clone(),
                        message: format!(
                            "parameter \"{}\" must be a boolean, integer, float or string",
                            parameter.name
                        ),
                    });
                }
            }
        }

        for event in &self.events {
            let field = format!("events.{}", event.id);
            match event.kind.as_str() {
                "disconnection" => {
                    if event.sides.contains(&0) {
                        errors.push(ConfigError {
                            field: field.clone(),
                            message: "sides are 1-based, 0 is not a side".into(),
                        });
                    }
                    if event.delta_p.is_some() {
                        errors.push(ConfigError {
                            field: field.clone(),
                            message: "delta_p only applies to power_variation events".into(),
                        });
                    }
                }
                "power_variation" => {
                    if event.delta_p.is_none() {
                        errors.push(ConfigError {
                            field: field.clone(),
                            message: "power_variation events require delta_p".into(),
                        });
                    }
                    if !event.sides.is_empty() {
                        errors.push(ConfigError {
                            field: field.clone(),
                            message: "sides only apply to disconnection events".into(),
                        });
                    }
                }
                other => {
                    errors.push(ConfigError {
                        field: field.clone(),
                        message: format!(
                            "kind must be \"disconnection\" or \"power_variation\", got \"{other}\""
                        ),
                    });
                }
            }
            for version in [&event.min_version, &event.max_version].into_iter().flatten() {
                if version.parse::<VersionTag>().is_err() {
                    errors.push(ConfigError {
                        field: field.clone(),
                        message: format!("invalid version \"{version}\""),
                    });
                }
            }
        }

        errors
    }

    /// Builds the network snapshot.
    pub fn build_network(&self) -> StaticNetwork {
        let mut net = StaticNetwork::new(&self.network.name);
        for bus in &self.network.buses {
            net.add_bus(&bus.id, bus.voltage_defined, bus.main_component);
        }
        for equipment in &self.network.equipment {
            let terminals = equipment
                .terminals
                .iter()
                .map(|t| Terminal {
                    bus_id: t.bus.clone(),
                    connected: t.connected && t.bus.is_some(),
                    dangling: t.dangling,
                })
                .collect();
            net.add_equipment(&equipment.id, equipment.kind, terminals);
        }
        net
    }

    /// Builds the model descriptors in declaration order.
    ///
    /// # Errors
    ///
    /// Returns the first conversion error; [`ScenarioConfig::validate`]
    /// reports the same problems exhaustively.
    pub fn build_models(&self) -> Result<Vec<ModelDescriptor>, ConfigError> {
        self.models.iter().map(build_model).collect()
    }

    /// Builds the event descriptors in declaration order.
    ///
    /// # Errors
    ///
    /// Returns the first conversion error.
    pub fn build_events(&self) -> Result<Vec<EventDescriptor>, ConfigError> {
        self.events.iter().map(build_event).collect()
    }

    /// Builds the assembler settings.
    ///
    /// # Errors
    ///
    /// Returns an error when the engine version or policy does not parse.
    pub fn build_settings(&self) -> Result<AssemblySettings, ConfigError> {
        let engine_version = self.engine.version.parse().map_err(|_| ConfigError {
            field: "engine.version".into(),
            message: format!("invalid version \"{}\"", self.engine.version),
        })?;
        let unresolved_policy = match self.engine.unresolved_targets.as_str() {
            "warn" => UnresolvedPolicy::Warn,
            "fail" => UnresolvedPolicy::Fail,
            other => {
                return Err(ConfigError {
                    field: "engine.unresolved_targets".into(),
                    message: format!("must be \"warn\" or \"fail\", got \"{other}\""),
                });
            }
        };
        Ok(AssemblySettings {
            engine_version,
            window: SimulationWindow::new(self.simulation.start_time, self.simulation.stop_time),
            use_simplifiers: self.engine.use_simplifiers,
            unresolved_policy,
            frequency_hz: self.simulation.frequency_hz,
        })
    }

    /// Builds the stage partition, when a staged phase is configured.
    pub fn build_partition(&self) -> Option<StagePartition> {
        let stages = self.stages.as_ref()?;
        let staged_ids: Vec<String> = stages.models.clone();
        Some(StagePartition::new(
            move |model| staged_ids.iter().any(|id| id == &model.dynamic_id),
            stages.stop_time,
        ))
    }
}

fn build_model(cfg: &ModelConfig) -> Result<ModelDescriptor, ConfigError> {
    let field = format!("models.{}", cfg.id);
    let mut model = match &cfg.equipment {
        Some(equipment) => ModelDescriptor::for_equipment(&cfg.id, &cfg.library, equipment),
        None => ModelDescriptor::new(&cfg.id, &cfg.library),
    };
    model.version = build_interval(&cfg.min_version, &cfg.max_version, &cfg.end_cause, &field)?;
    if let Some(set) = &cfg.parameter_set {
        model.parameter_set_id = set.clone();
    }
    model.capabilities.frequency_synchronized = cfg.frequency_synchronized;
    model.capabilities.signal_n = cfg.signal_n;
    model.capabilities.synchronized_to_bus = cfg.synchronized_to_bus;
    model.capabilities.requires_companions = cfg.requires_companions;
    model.capabilities.forbids_defaults = cfg.forbids_defaults.clone();
    model.static_vars = cfg.static_vars.clone();
    for parameter in &cfg.parameters {
        let value = param_value(&parameter.value).map_err(|message| ConfigError {
            field: field.clone(),
            message: format!("parameter \"{}\": {message}", parameter.name),
        })?;
        model.parameters.push(Parameter::new(&parameter.name, value));
    }
    for connection in &cfg.connections {
        let target = match (&connection.to_equipment, &connection.to_model) {
            (Some(equipment), None) => TargetRef::Equipment(equipment.clone()),
            (None, Some(id)) => TargetRef::Pure(id.clone()),
            _ => {
                return Err(ConfigError {
                    field,
                    message: format!(
                        "connection \"{}\" must set exactly one of to_equipment and to_model",
                        connection.connector
                    ),
                });
            }
        };
        model.connections.push(ConnectionRequest::new(
            &connection.connector,
            connection.mappings.clone(),
            target,
        ));
    }
    Ok(model)
}

fn build_event(cfg: &EventConfig) -> Result<EventDescriptor, ConfigError> {
    let field = format!("events.{}", cfg.id);
    let mut event = match cfg.kind.as_str() {
        "disconnection" => EventDescriptor::disconnection(
            &cfg.id,
            &cfg.equipment,
            cfg.start_time,
            cfg.sides.clone(),
        ),
        "power_variation" => {
            let delta_p = cfg.delta_p.ok_or_else(|| ConfigError {
                field: field.clone(),
                message: "power_variation events require delta_p".into(),
            })?;
            EventDescriptor::power_variation(&cfg.id, &cfg.equipment, cfg.start_time, delta_p)
        }
        other => {
            return Err(ConfigError {
                field,
                message: format!(
                    "kind must be \"disconnection\" or \"power_variation\", got \"{other}\""
                ),
            });
        }
    };
    event.version = build_interval(&cfg.min_version, &cfg.max_version, &cfg.end_cause, &field)?;
    Ok(event)
}

fn build_interval(
    min: &Option<String>,
    max: &Option<String>,
    end_cause: &Option<String>,
    field: &str,
) -> Result<VersionInterval, ConfigError> {
    let parse = |s: &String| {
        s.parse::<VersionTag>().map_err(|_| ConfigError {
            field: field.to_string(),
            message: format!("invalid version \"{s}\""),
        })
    };
    let mut interval = VersionInterval::default();
    if let Some(min) = min {
        interval.min = parse(min)?;
    }
    if let Some(max) = max {
        interval.max = Some(parse(max)?);
    }
    interval.end_cause = end_cause.clone();
    Ok(interval)
}

fn param_value(value: &toml::Value) -> Result<ParamValue, String> {
    match value {
        toml::Value::Boolean(v) => Ok(ParamValue::Bool(*v)),
        toml::Value::Integer(v) => Ok(ParamValue::Int(*v)),
        toml::Value::Float(v) => Ok(ParamValue::Number(*v)),
        toml::Value::String(v) => Ok(ParamValue::Text(v.clone())),
        other => Err(format!("expected a scalar value, got {}", other.type_str())),
    }
}

fn bus(id: &str) -> BusConfig {
    BusConfig {
        id: id.to_string(),
        voltage_defined: true,
        main_component: true,
    }
}

fn equipment(id: &str, kind: EquipmentKind, buses: &[&str]) -> EquipmentConfig {
    EquipmentConfig {
        id: id.to_string(),
        kind,
        terminals: buses
            .iter()
            .map(|bus| TerminalConfig {
                bus: Some(bus.to_string()),
                connected: true,
                dangling: false,
            })
            .collect(),
    }
}

fn model(id: &str, library: &str, equipment: Option<&str>) -> ModelConfig {
    ModelConfig {
        id: id.to_string(),
        library: library.to_string(),
        equipment: equipment.map(String::from),
        min_version: None,
        max_version: None,
        end_cause: None,
        parameter_set: None,
        frequency_synchronized: false,
        signal_n: false,
        synchronized_to_bus: false,
        requires_companions: false,
        forbids_defaults: Vec::new(),
        static_vars: Vec::new(),
        parameters: Vec::new(),
        connections: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_preset_valid() {
        let cfg = ScenarioConfig::baseline();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "baseline should be valid: {errors:?}");
    }

    #[test]
    fn all_presets_are_valid() {
        for name in ScenarioConfig::PRESETS {
            let cfg = ScenarioConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.map(|c| c.validate()).unwrap_or_default();
            assert!(
                errors.is_empty(),
                "preset \"{name}\" should be valid: {errors:?}"
            );
        }
    }

    #[test]
    fn from_preset_unknown() {
        let err = ScenarioConfig::from_preset("nonexistent").unwrap_err();
        assert!(err.message.contains("unknown preset"));
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[engine]
version = "1.4"
use_simplifiers = true
unresolved_targets = "fail"

[simulation]
start_time = 0.0
stop_time = 60.0
frequency_hz = 60.0

[network]
name = "mini"

[[network.buses]]
id = "B1"

[[network.equipment]]
id = "G1"
kind = "generator"
terminals = [{ bus = "B1" }]

[[models]]
id = "g1"
library = "GeneratorFourWindings"
equipment = "G1"
min_version = "1.2"
frequency_synchronized = true
static_vars = [{ from = "generator_p_pu", to = "p" }]
parameters = [{ name = "droop", value = 0.05 }]

[[events]]
id = "ev1"
kind = "disconnection"
equipment = "G1"
start_time = 30.0
"#;
        let cfg = ScenarioConfig::from_toml_str(toml).unwrap();
        assert_eq!(cfg.engine.version, "1.4");
        assert!(cfg.engine.use_simplifiers);
        assert_eq!(cfg.models.len(), 1);
        assert_eq!(cfg.events.len(), 1);
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[engine]
version = "1.3"
bogus_field = true
"#;
        let result = ScenarioConfig::from_toml_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml = r#"
[simulation]
stop_time = 50.0
"#;
        let cfg = ScenarioConfig::from_toml_str(toml).unwrap();
        assert_eq!(cfg.simulation.stop_time, 50.0);
        // other sections keep their defaults
        assert_eq!(cfg.engine.version, "1.3.0");
        assert!(cfg.models.is_empty());
        assert!(cfg.stages.is_none());
    }

    #[test]
    fn validation_catches_bad_engine_version() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.engine.version = "one.two".to_string();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "engine.version"));
    }

    #[test]
    fn validation_catches_bad_policy() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.engine.unresolved_targets = "ignore".to_string();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "engine.unresolved_targets"));
    }

    #[test]
    fn validation_catches_inverted_window() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.simulation.stop_time = cfg.simulation.start_time;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "simulation.start_time"));
    }

    #[test]
    fn validation_catches_staged_stop_inside_primary_window() {
        let mut cfg = ScenarioConfig::staged();
        if let Some(stages) = cfg.stages.as_mut() {
            stages.stop_time = 80.0;
        }
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "stages.stop_time"));
    }

    #[test]
    fn validation_catches_unknown_staged_model() {
        let mut cfg = ScenarioConfig::staged();
        if let Some(stages) = cfg.stages.as_mut() {
            stages.models.push("ghost".to_string());
        }
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "stages.models"));
    }

    #[test]
    fn validation_catches_unknown_bus_reference() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.network.equipment[0].terminals[0].bus = Some("B9".to_string());
        let errors = cfg.validate();
        assert!(errors
            .iter()
            .any(|e| e.field == "network.equipment.G1" && e.message.contains("B9")));
    }

    #[test]
    fn validation_catches_unknown_model_equipment() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.models[0].equipment = Some("G9".to_string());
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "models.g1"));
    }

    #[test]
    fn validation_catches_ambiguous_connection_target() {
        let mut cfg = ScenarioConfig::staged();
        if let Some(connection) = cfg
            .models
            .last_mut()
            .and_then(|m| m.connections.last_mut())
        {
            connection.to_model = Some("ld1".to_string());
        }
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "models.load_shed"));
    }

    #[test]
    fn validation_catches_event_kind_mismatches() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.events[0].kind = "explosion".to_string();
        assert!(cfg.validate().iter().any(|e| e.field == "events.ev_line_trip"));

        let mut cfg = ScenarioConfig::baseline();
        cfg.events[0].delta_p = Some(1.0);
        assert!(cfg
            .validate()
            .iter()
            .any(|e| e.message.contains("delta_p only applies")));

        let mut cfg = ScenarioConfig::signal_n();
        cfg.events[0].delta_p = None;
        assert!(cfg
            .validate()
            .iter()
            .any(|e| e.message.contains("require delta_p")));
    }

    #[test]
    fn validation_catches_non_scalar_parameter() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.models[0].parameters.push(ParamEntryConfig {
            name: "weights".to_string(),
            value: toml::Value::Array(vec![]),
        });
        let errors = cfg.validate();
        assert!(errors
            .iter()
            .any(|e| e.message.contains("must be a boolean, integer, float or string")));
    }

    #[test]
    fn build_models_converts_fields() {
        let cfg = ScenarioConfig::baseline();
        let models = cfg.build_models().unwrap();
        assert_eq!(models.len(), 2);
        assert_eq!(models[0].dynamic_id, "g1");
        assert_eq!(models[0].equipment_id.as_deref(), Some("G1"));
        assert!(models[0].capabilities.frequency_synchronized);
        assert_eq!(models[0].static_vars.len(), 2);
        assert_eq!(models[0].parameter_set_id, "g1");
    }

    #[test]
    fn build_network_marks_disconnected_terminals() {
        use crate::network::Network;

        let mut cfg = ScenarioConfig::baseline();
        cfg.network.equipment[2].terminals[1] = TerminalConfig {
            bus: None,
            connected: true,
            dangling: false,
        };
        let net = cfg.build_network();
        assert!(!net.is_fully_connected("LN1"));
        assert!(net.is_fully_connected("G1"));
    }

    #[test]
    fn build_settings_maps_policy_and_window() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.engine.unresolved_targets = "fail".to_string();
        let settings = cfg.build_settings().unwrap();
        assert_eq!(settings.unresolved_policy, UnresolvedPolicy::Fail);
        assert_eq!(settings.window.start, 0.0);
        assert_eq!(settings.window.stop, 100.0);
        assert_eq!(settings.engine_version, VersionTag::new(1, 3));
    }

    #[test]
    fn build_partition_matches_configured_ids() {
        let cfg = ScenarioConfig::staged();
        let partition = cfg.build_partition().unwrap();
        let models = cfg.build_models().unwrap();
        let staged: Vec<_> = models
            .iter()
            .filter(|m| partition.is_staged(m))
            .map(|m| m.dynamic_id.as_str())
            .collect();
        assert_eq!(staged, vec!["load_shed"]);
        assert_eq!(partition.stop_time(), 200.0);
        assert!(ScenarioConfig::baseline().build_partition().is_none());
    }

    #[test]
    fn build_events_requires_kind_consistency() {
        let mut cfg = ScenarioConfig::signal_n();
        cfg.events[0].delta_p = None;
        assert!(cfg.build_events().is_err());
    }

    #[test]
    fn inline_parameters_convert_to_typed_values() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.models[0].parameters = vec![
            ParamEntryConfig {
                name: "droop".into(),
                value: toml::Value::Float(0.05),
            },
            ParamEntryConfig {
                name: "windings".into(),
                value: toml::Value::Integer(4),
            },
            ParamEntryConfig {
                name: "pss".into(),
                value: toml::Value::Boolean(true),
            },
        ];
        let models = cfg.build_models().unwrap();
        assert_eq!(models[0].parameters.len(), 3);
        assert_eq!(models[0].parameters[0].value, ParamValue::Number(0.05));
        assert_eq!(models[0].parameters[1].value, ParamValue::Int(4));
        assert_eq!(models[0].parameters[2].value, ParamValue::Bool(true));
    }
}
