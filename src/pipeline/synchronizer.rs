//! Selection and synthesis of the grid-coordination model.
//!
//! At most one synchronizer exists per assembly. Which one depends on the
//! capabilities of the accepted models: signal-N sources get the aggregate
//! signal-N model, frequency-synchronized sources get a frequency reference,
//! and the two families refuse to share a grid.

use crate::error::AssemblyError;
use crate::model::{ConnectionRequest, ModelDescriptor, TargetRef, VarMapping};
use crate::network::Network;
use crate::params::{ParamValue, Parameter};

/// Dynamic id of the synthesized synchronizer.
pub const SYNCHRONIZER_ID: &str = "synchronizer";
/// Library of the aggregate signal-N coordination model.
pub const SIGNAL_N_LIBRARY: &str = "SignalN";
/// Library of the global frequency reference.
pub const REFERENCE_FREQUENCY_LIBRARY: &str = "ReferenceFrequency";
/// Library of the frequency reference anchored to a specific bus.
pub const BUS_ANCHORED_FREQUENCY_LIBRARY: &str = "BusAnchoredFrequency";

/// Synthesizes the synchronizer implied by `models`, if any.
///
/// The returned descriptor carries its wiring requests and inline default
/// parameters, so downstream it behaves exactly like a declared model.
///
/// # Errors
///
/// [`AssemblyError::SynchronizerConflict`] when frequency-synchronized and
/// signal-N models are both present.
pub fn synthesize(
    models: &[ModelDescriptor],
    network: &dyn Network,
    frequency_hz: f64,
) -> Result<Option<ModelDescriptor>, AssemblyError> {
    let frequency: Vec<&ModelDescriptor> = models
        .iter()
        .filter(|m| m.capabilities.frequency_synchronized)
        .collect();
    let signal_n: Vec<&ModelDescriptor> =
        models.iter().filter(|m| m.capabilities.signal_n).collect();

    if !frequency.is_empty() && !signal_n.is_empty() {
        return Err(AssemblyError::SynchronizerConflict {
            frequency: frequency.iter().map(|m| m.dynamic_id.clone()).collect(),
            signal_n: signal_n.iter().map(|m| m.dynamic_id.clone()).collect(),
        });
    }

    if !signal_n.is_empty() {
        return Ok(Some(signal_n_model(&signal_n, network)));
    }
    if !frequency.is_empty() {
        return Ok(Some(frequency_model(&frequency, network, frequency_hz)));
    }
    Ok(None)
}

fn signal_n_model(sources: &[&ModelDescriptor], network: &dyn Network) -> ModelDescriptor {
    let mut model = ModelDescriptor::new(SYNCHRONIZER_ID, SIGNAL_N_LIBRARY);
    model.parameter_set_id = format!("signal_n_{}", network.name());
    model.parameters.push(Parameter::new(
        "source_count",
        ParamValue::Int(sources.len() as i64),
    ));
    model.connections = sources
        .iter()
        .map(|source| {
            ConnectionRequest::new(
                &format!("{}To{}", SIGNAL_N_LIBRARY, source.library),
                vec![VarMapping::new("signal_n_value", "n_setpoint_value")],
                TargetRef::to_model(source),
            )
        })
        .collect();
    model
}

fn frequency_model(
    sources: &[&ModelDescriptor],
    network: &dyn Network,
    frequency_hz: f64,
) -> ModelDescriptor {
    // Any bus-anchored source switches the whole reference to the anchored
    // strategy.
    let anchor = sources.iter().find(|m| m.capabilities.synchronized_to_bus);
    let library = match anchor {
        Some(_) => BUS_ANCHORED_FREQUENCY_LIBRARY,
        None => REFERENCE_FREQUENCY_LIBRARY,
    };

    let mut model = ModelDescriptor::new(SYNCHRONIZER_ID, library);
    model.parameter_set_id = format!("frequency_{}", network.name());
    model.parameters.push(Parameter::new(
        "source_count",
        ParamValue::Int(sources.len() as i64),
    ));
    match anchor {
        Some(anchored) => {
            model.parameters.push(Parameter::new(
                "anchor_model",
                ParamValue::Text(anchored.dynamic_id.clone()),
            ));
        }
        None => {
            model.parameters.push(Parameter::new(
                "nominal_frequency_hz",
                ParamValue::Number(frequency_hz),
            ));
        }
    }
    model.connections = sources
        .iter()
        .map(|source| {
            ConnectionRequest::new(
                &format!("{}To{}", library, source.library),
                vec![VarMapping::new("omega_ref_value", "omega_ref_pu_value")],
                TargetRef::to_model(source),
            )
        })
        .collect();
    model
}
