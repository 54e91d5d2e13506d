// Path: crates/types/src/app/mod.rs
//! Identity and genesis-level data shared by every node in a local network.

/// Genesis parsing helpers, such as the network identifier lookup.
pub mod genesis;
/// The canonical `NodeId` and its derivation from staking credentials.
pub mod identity;

pub use genesis::network_id_from_genesis;
pub use identity::{NodeId, NODE_ID_LEN, NODE_ID_PREFIX};
