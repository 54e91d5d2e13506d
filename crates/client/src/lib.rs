// Path: crates/client/src/lib.rs
//! # Network Runner Client Crate Lints
//!
//! This crate enforces a strict set of lints to ensure panic-free code. Panics
//! are disallowed in non-test code to promote robust error handling.
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

//! # Network Runner Client
//!
//! Provides the API client the orchestrator uses to talk to running nodes. The
//! orchestrator only depends on the traits in [`api`]; [`http`] is the default
//! JSON-RPC-over-HTTP implementation.

pub mod api;
pub mod http;

// Re-export for convenience
pub use api::{new_http_api_client_fn, ApiClient, EthApi, HealthApi, NewApiClientFn};
pub use http::HttpApiClient;
