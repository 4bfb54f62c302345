//! The assembly pipeline, from raw descriptors to stage bundles.

/// Pipeline orchestration.
pub mod assembler;
/// Macro-connection resolution.
pub mod connections;
/// Stable acceptance filters.
pub mod filters;
/// Topology-driven model reduction.
pub mod simplifiers;
/// Primary/staged phase partitioning.
pub mod stages;
/// Grid-coordination model synthesis.
pub mod synchronizer;

// Re-export the main types for convenience
pub use assembler::Assembler;
pub use assembler::Assembly;
pub use assembler::AssemblySettings;
pub use connections::ConnectionResolver;
pub use connections::MacroConnect;
pub use connections::MacroConnector;
pub use connections::ResolvedConnections;
pub use connections::StaticReference;
pub use connections::UnresolvedPolicy;
pub use simplifiers::RemovalSimplifier;
pub use simplifiers::SimplifierChain;
pub use simplifiers::SubstitutionSimplifier;
pub use stages::SimulationWindow;
pub use stages::StageBundle;
pub use stages::StagePartition;
