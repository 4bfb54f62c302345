//! Stage partitioning: splitting one run into primary and staged phases.

use std::fmt;

use crate::model::{EventDescriptor, ModelDescriptor};
use crate::pipeline::connections::ResolvedConnections;

/// Name of the stage covering the caller's simulation window.
pub const PRIMARY_STAGE: &str = "primary";
/// Name of the follow-on stage that picks up where the primary stops.
pub const STAGED_STAGE: &str = "staged";

/// Half-open simulation window `[start, stop)` in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationWindow {
    pub start: f64,
    pub stop: f64,
}

impl SimulationWindow {
    /// # Panics
    ///
    /// Panics if `stop` is not after `start`.
    pub fn new(start: f64, stop: f64) -> Self {
        assert!(stop > start, "window must end after it starts");
        SimulationWindow { start, stop }
    }

    pub fn duration(&self) -> f64 {
        self.stop - self.start
    }
}

impl fmt::Display for SimulationWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})s", self.start, self.stop)
    }
}

/// Caller-supplied rule marking which accepted models belong to the staged
/// phase, plus the time at which that phase ends.
pub struct StagePartition {
    predicate: Box<dyn Fn(&ModelDescriptor) -> bool>,
    stop_time: f64,
}

impl StagePartition {
    pub fn new(predicate: impl Fn(&ModelDescriptor) -> bool + 'static, stop_time: f64) -> Self {
        StagePartition {
            predicate: Box::new(predicate),
            stop_time,
        }
    }

    pub fn is_staged(&self, model: &ModelDescriptor) -> bool {
        (self.predicate)(model)
    }

    pub fn stop_time(&self) -> f64 {
        self.stop_time
    }
}

impl fmt::Debug for StagePartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StagePartition")
            .field("stop_time", &self.stop_time)
            .finish_non_exhaustive()
    }
}

/// Everything the downstream serializer needs for one simulation stage.
#[derive(Debug, Clone)]
pub struct StageBundle {
    pub name: &'static str,
    pub window: SimulationWindow,
    pub models: Vec<ModelDescriptor>,
    /// Events wired into this stage; always empty for the staged phase.
    pub events: Vec<EventDescriptor>,
    pub connections: ResolvedConnections,
}

/// Splits the accepted models into primary and staged subsets, preserving
/// relative order inside each.
pub fn split_models(
    models: Vec<ModelDescriptor>,
    partition: Option<&StagePartition>,
) -> (Vec<ModelDescriptor>, Vec<ModelDescriptor>) {
    match partition {
        Some(partition) => models.into_iter().partition(|m| !partition.is_staged(m)),
        None => (models, Vec::new()),
    }
}
