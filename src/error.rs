//! Fatal assembly failures.
//!
//! Each variant names a declaration-level contradiction the pipeline cannot
//! repair by dropping a single descriptor, so the whole run aborts.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum AssemblyError {
    /// Frequency-synchronized and signal-N models were both accepted; the
    /// two coordination schemes cannot share a grid.
    #[error(
        "synchronizer conflict: frequency-synchronized models [{}] cannot coexist with signal-N models [{}]",
        .frequency.join(", "),
        .signal_n.join(", ")
    )]
    SynchronizerConflict {
        frequency: Vec<String>,
        signal_n: Vec<String>,
    },

    /// A model that forbids default models was accepted while some equipment
    /// of a governed kind has no explicit model.
    #[error(
        "model \"{model_id}\" forbids defaults for {kind} equipment, but [{}] have no explicit model",
        .missing.join(", ")
    )]
    MissingExplicitModels {
        model_id: String,
        kind: String,
        missing: Vec<String>,
    },

    /// An event asked to open a terminal side that can never be opened.
    #[error(
        "event \"{event_id}\" targets side {side} of \"{equipment_id}\", which is dangling and cannot be disconnected"
    )]
    DanglingEventTarget {
        event_id: String,
        equipment_id: String,
        side: u8,
    },

    /// A connection target failed to resolve under the fail policy, or on a
    /// model that requires explicitly declared companions.
    #[error(
        "model \"{model_id}\" requests connector \"{connector}\" to \"{target}\", which no accepted model answers to"
    )]
    UnresolvedTarget {
        model_id: String,
        connector: String,
        target: String,
    },
}
