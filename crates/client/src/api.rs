// Path: crates/client/src/api.rs
//! Client-side traits the orchestrator depends on.

use crate::http::HttpApiClient;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Builds an API client for the node listening on `(host, api_port)`.
pub type NewApiClientFn = Arc<dyn Fn(&str, u16) -> Arc<dyn ApiClient> + Send + Sync>;

/// The default factory, producing [`HttpApiClient`]s.
pub fn new_http_api_client_fn() -> NewApiClientFn {
    Arc::new(|host, port| Arc::new(HttpApiClient::new(host, port)) as Arc<dyn ApiClient>)
}

/// A handle to one node's API surface.
pub trait ApiClient: Send + Sync {
    /// The node's health endpoint.
    fn health_api(&self) -> &dyn HealthApi;

    /// The node's C-Chain Ethereum endpoint.
    ///
    /// It must be closed before the node process is terminated.
    fn cchain_eth_api(&self) -> &dyn EthApi;
}

#[async_trait]
pub trait HealthApi: Send + Sync {
    /// Returns whether the node reports itself healthy.
    async fn health(&self) -> Result<bool>;
}

#[async_trait]
pub trait EthApi: Send + Sync {
    /// Releases any connection held to the endpoint. Idempotent.
    fn close(&self);

    /// Returns the height of the latest accepted C-Chain block.
    async fn block_number(&self) -> Result<u64>;
}
