// Path: crates/types/src/lib.rs
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
        clippy::indexing_slicing
    )
)]

//! # Network Runner Types
//!
//! This crate is the foundational library for the local network runner. It holds the
//! network and node configuration objects, the typed command-line flag model, node
//! identity derivation and the error type surfaced by the orchestrator.
//!
//! ## Architectural Role
//!
//! As the base crate, `netrunner-types` has minimal dependencies and is a dependency
//! of every other crate in the workspace. Keeping the configuration and error types
//! here lets the client, telemetry and orchestrator crates agree on a single canonical
//! definition without depending on each other.

/// Node identity (`NodeId`) and genesis-derived network identifiers.
pub mod app;
/// Network and node configuration objects, including the typed flag model.
pub mod config;
/// The error type returned by every orchestrator operation.
pub mod error;

pub use app::{network_id_from_genesis, NodeId, NODE_ID_PREFIX};
pub use config::{FlagKey, FlagValue, Flags, LocalNodeConfig, NetworkConfig, NodeConfig};
pub use error::NetworkError;
