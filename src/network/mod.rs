//! Grid topology interface and the in-memory network used by the demo.

/// Fixed in-memory network snapshot.
pub mod static_network;
pub mod types;

// Re-export the main types for convenience
pub use static_network::Bus;
pub use static_network::StaticNetwork;
pub use types::EquipmentKind;
pub use types::Network;
pub use types::Terminal;
