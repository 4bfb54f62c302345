//! Assembly and validation of dynamic-simulation inputs for power grids.

pub mod config;
pub mod error;
pub mod io;
pub mod model;
pub mod network;
pub mod params;
/// Acceptance filters, simplifiers, synchronizer selection and stage assembly.
pub mod pipeline;
pub mod report;
pub mod version;
