//! Export of assembly results.

pub mod export;

// Re-export the main entry points for convenience.
pub use export::{export_csv, write_csv};
