// crates/forge/src/lib.rs

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

//! # Network Runner Forge Library
//!
//! This library stands up and supervises a local cluster of validator processes so
//! that tests and CI jobs can exercise a multi-node network without real
//! infrastructure.
//!
//! ## Architectural Boundary and Purpose
//!
//! `forge` owns the *orchestration* of a local network and nothing else:
//!
//! 1.  **Collaborators behind traits:** processes are created through
//!     [`local::NodeProcessCreator`] and nodes are queried through
//!     [`netrunner_client::ApiClient`]. Tests substitute both.
//!
//! 2.  **No chain logic:** the orchestrator knows that a node has a staking
//!     identity, two ports and a health endpoint. Genesis and config file contents
//!     are opaque payloads that are written to disk and handed to the node.
//!
//! 3.  **Single writer:** the [`local::LocalNetwork`] is the sole owner of the live
//!     node table and the bootstrap registry. Callers only ever receive copies.
//!
//! This crate contains modules for:
//! - `local`: the process-backed network orchestrator and its building blocks.

pub mod local;

pub use local::{LocalNetwork, NetworkOptions, Node};
