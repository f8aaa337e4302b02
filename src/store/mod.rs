//! Value types shared by every stage: variables, edges, tier ranks and the output network.
pub mod network;
pub mod types;

pub use network::Network;
pub use types::{edge_set, Edge, EdgeSet, TierMap, Variable};
