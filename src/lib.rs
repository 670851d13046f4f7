// Re-export all public modules
pub mod announcement;
pub mod as_graph;
pub mod policy;
pub mod shared;
pub mod simulator;
pub mod topology_loader;

// Re-export commonly used types at the crate root
pub use announcement::{Announcement, Prefix};
pub use as_graph::{AsGraph, AsNode};
pub use policy::{Bgp, LocalRib, Policy, Rov};
pub use shared::{Relationship, SimulatorError, ASN};
pub use simulator::{RibEntry, Simulator};
pub use topology_loader::{RelationshipFileLoader, TopologyLoader};
