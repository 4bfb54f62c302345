//! Model and event descriptors plus the registry that indexes them.

/// Event declarations and their two-phase connection binding.
pub mod event;
/// Identity index over the accepted model set.
pub mod registry;
pub mod types;

// Re-export the main types for convenience
pub use event::EventDescriptor;
pub use event::EventKind;
pub use registry::ModelRegistry;
pub use registry::NETWORK_ID;
pub use types::ConnectionRequest;
pub use types::Descriptor;
pub use types::ModelCapabilities;
pub use types::ModelDescriptor;
pub use types::TargetRef;
pub use types::VarMapping;
