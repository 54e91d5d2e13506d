// Path: crates/client/src/http.rs
//! JSON-RPC over HTTP implementation of the node API traits.

use crate::api::{ApiClient, EthApi, HealthApi};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

const HEALTH_PATH: &str = "/ext/health";
const CCHAIN_RPC_PATH: &str = "/ext/bc/C/rpc";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Talks to a node's HTTP API at `http://<host>:<port>`.
#[derive(Debug)]
pub struct HttpApiClient {
    health: HttpHealthApi,
    eth: HttpEthApi,
}

impl HttpApiClient {
    pub fn new(host: &str, port: u16) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        let base = format!("http://{host}:{port}");
        Self {
            health: HttpHealthApi {
                client: client.clone(),
                url: format!("{base}{HEALTH_PATH}"),
            },
            eth: HttpEthApi {
                client: Mutex::new(Some(client)),
                url: format!("{base}{CCHAIN_RPC_PATH}"),
            },
        }
    }
}

impl ApiClient for HttpApiClient {
    fn health_api(&self) -> &dyn HealthApi {
        &self.health
    }

    fn cchain_eth_api(&self) -> &dyn EthApi {
        &self.eth
    }
}

#[derive(Debug)]
struct HttpHealthApi {
    client: Client,
    url: String,
}

#[async_trait]
impl HealthApi for HttpHealthApi {
    async fn health(&self) -> Result<bool> {
        let result = call(&self.client, &self.url, "health.health", json!({})).await?;
        result
            .get("healthy")
            .and_then(Value::as_bool)
            .ok_or_else(|| anyhow!("health response has no boolean 'healthy' field: {result}"))
    }
}

#[derive(Debug)]
struct HttpEthApi {
    // `None` once closed.
    client: Mutex<Option<Client>>,
    url: String,
}

#[async_trait]
impl EthApi for HttpEthApi {
    fn close(&self) {
        if self.client.lock().take().is_some() {
            tracing::trace!(url = %self.url, "closed C-Chain client");
        }
    }

    async fn block_number(&self) -> Result<u64> {
        let client = self
            .client
            .lock()
            .clone()
            .ok_or_else(|| anyhow!("C-Chain client is closed"))?;
        let result = call(&client, &self.url, "eth_blockNumber", json!([])).await?;
        let hex = result
            .as_str()
            .ok_or_else(|| anyhow!("unexpected eth_blockNumber result: {result}"))?;
        u64::from_str_radix(hex.trim_start_matches("0x"), 16)
            .map_err(|e| anyhow!("invalid block number {hex:?}: {e}"))
    }
}

/// Performs one JSON-RPC call and returns its `result` member.
async fn call(client: &Client, url: &str, method: &str, params: Value) -> Result<Value> {
    let req = json!({ "jsonrpc": "2.0", "method": method, "params": params, "id": 1 });
    let resp = client.post(url).json(&req).send().await?;
    let status = resp.status();
    let text = resp.text().await?;

    if !status.is_success() {
        return Err(anyhow!("{method} failed with status {status}: {text}"));
    }

    let mut v: Value = serde_json::from_str(&text)
        .map_err(|e| anyhow!("Invalid JSON-RPC response from {url}: {e}. Body: '{text}'"))?;
    if let Some(err) = v.get("error") {
        if !err.is_null() {
            return Err(anyhow!("RPC error: {err}"));
        }
    }
    match v.get_mut("result").map(Value::take) {
        Some(result) => Ok(result),
        None => Err(anyhow!("JSON-RPC response has no result: {text}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves a single HTTP request with the given JSON body and returns the request text.
    async fn serve_once(body: &'static str) -> (u16, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                buf.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&buf).to_string();
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text[..header_end]
                        .lines()
                        .find_map(|l| {
                            let lower = l.to_ascii_lowercase();
                            lower
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap())
                        })
                        .unwrap_or(0);
                    if buf.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&buf).to_string()
        });
        (port, handle)
    }

    #[tokio::test]
    async fn health_reads_healthy_field() {
        let (port, server) =
            serve_once(r#"{"jsonrpc":"2.0","result":{"checks":{},"healthy":true},"id":1}"#).await;
        let client = HttpApiClient::new("127.0.0.1", port);
        assert!(client.health_api().health().await.unwrap());

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /ext/health"));
        assert!(request.contains("health.health"));
    }

    #[tokio::test]
    async fn rpc_errors_are_surfaced() {
        let (port, _server) = serve_once(
            r#"{"jsonrpc":"2.0","error":{"code":-32000,"message":"not ready"},"id":1}"#,
        )
        .await;
        let client = HttpApiClient::new("127.0.0.1", port);
        let err = client.health_api().health().await.unwrap_err();
        assert!(err.to_string().contains("not ready"));
    }

    #[tokio::test]
    async fn block_number_parses_hex_and_close_rejects_calls() {
        let (port, _server) = serve_once(r#"{"jsonrpc":"2.0","result":"0x2a","id":1}"#).await;
        let client = HttpApiClient::new("127.0.0.1", port);
        assert_eq!(client.cchain_eth_api().block_number().await.unwrap(), 42);

        client.cchain_eth_api().close();
        client.cchain_eth_api().close();
        assert!(client.cchain_eth_api().block_number().await.is_err());
    }
}
