// Path: crates/forge/tests/common/mod.rs

//! In-memory doubles for the process creator and the API client.

#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use netrunner_client::{ApiClient, EthApi, HealthApi, NewApiClientFn};
use netrunner_forge::local::{NodeProcess, NodeProcessCreator};
use netrunner_forge::{LocalNetwork, NetworkOptions};
use netrunner_types::{LocalNodeConfig, NetworkConfig, NetworkError, NodeConfig};
use parking_lot::Mutex;
use rcgen::{generate_simple_self_signed, CertifiedKey};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub const GENESIS: &str = r#"{"networkID": 1337, "allocations": []}"#;

/// A fresh self-signed staking key and certificate, PEM-encoded.
pub fn staking_pems() -> (String, String) {
    let CertifiedKey { cert, key_pair } =
        generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
    (key_pair.serialize_pem(), cert.pem())
}

pub fn node_config(name: Option<&str>, is_beacon: bool) -> NodeConfig {
    let (staking_key, staking_cert) = staking_pems();
    NodeConfig {
        name: name.map(str::to_string),
        staking_key,
        staking_cert,
        is_beacon,
        impl_specific_config: LocalNodeConfig::new("/usr/local/bin/node"),
        ..Default::default()
    }
}

pub fn network_config(nodes: Vec<NodeConfig>) -> NetworkConfig {
    NetworkConfig {
        name: "test network".to_string(),
        genesis: GENESIS.to_string(),
        node_configs: nodes,
        ..Default::default()
    }
}

/// Everything the fake processes did, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEvent {
    Started(String),
    Stopped(String),
    Exited(String),
}

/// Shared script and record of the fake processes.
#[derive(Default)]
pub struct ProcessBoard {
    pub events: Mutex<Vec<ProcessEvent>>,
    /// Command lines handed to the creator, by node name.
    pub args: Mutex<HashMap<String, Vec<String>>>,
    pub fail_create: Mutex<HashSet<String>>,
    pub fail_start: Mutex<HashSet<String>>,
    pub fail_stop: Mutex<HashSet<String>>,
    pub fail_wait: Mutex<HashSet<String>>,
    /// Delay `wait` by this much, to make removals slow.
    pub wait_delay: Mutex<Option<Duration>>,
}

impl ProcessBoard {
    pub fn events(&self) -> Vec<ProcessEvent> {
        self.events.lock().clone()
    }

    pub fn started(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ProcessEvent::Started(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    pub fn stopped(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ProcessEvent::Stopped(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    pub fn args_of(&self, name: &str) -> Vec<String> {
        self.args.lock().get(name).cloned().unwrap_or_default()
    }
}

pub struct FakeCreator(pub Arc<ProcessBoard>);

impl NodeProcessCreator for FakeCreator {
    fn new_node_process(
        &self,
        config: &NodeConfig,
        args: &[String],
    ) -> Result<Box<dyn NodeProcess>> {
        let name = config.name_or_default().to_string();
        if self.0.fail_create.lock().contains(&name) {
            return Err(anyhow!("scripted create failure"));
        }
        self.0.args.lock().insert(name.clone(), args.to_vec());
        Ok(Box::new(FakeProcess {
            name,
            board: self.0.clone(),
        }))
    }
}

struct FakeProcess {
    name: String,
    board: Arc<ProcessBoard>,
}

#[async_trait]
impl NodeProcess for FakeProcess {
    fn start(&mut self) -> Result<()> {
        if self.board.fail_start.lock().contains(&self.name) {
            return Err(anyhow!("scripted start failure"));
        }
        self.board
            .events
            .lock()
            .push(ProcessEvent::Started(self.name.clone()));
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if self.board.fail_stop.lock().contains(&self.name) {
            return Err(anyhow!("scripted stop failure"));
        }
        self.board
            .events
            .lock()
            .push(ProcessEvent::Stopped(self.name.clone()));
        Ok(())
    }

    async fn wait(&mut self) -> Result<()> {
        let delay = *self.board.wait_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.board.fail_wait.lock().contains(&self.name) {
            return Err(anyhow!("exit status: 1"));
        }
        self.board
            .events
            .lock()
            .push(ProcessEvent::Exited(self.name.clone()));
        Ok(())
    }
}

/// Scripted health answers and a record of closed C-Chain clients, keyed by API port.
#[derive(Default)]
pub struct HealthBoard {
    pub all_healthy: Mutex<bool>,
    pub healthy_ports: Mutex<HashSet<u16>>,
    pub erroring_ports: Mutex<HashSet<u16>>,
    pub closed_ports: Mutex<Vec<u16>>,
    pub checks: Mutex<usize>,
}

impl HealthBoard {
    pub fn healthy() -> Arc<Self> {
        let board = Self::default();
        *board.all_healthy.lock() = true;
        Arc::new(board)
    }
}

pub fn fake_client_fn(board: Arc<HealthBoard>) -> NewApiClientFn {
    Arc::new(move |_host, port| {
        Arc::new(FakeClient {
            health: FakeHealth {
                port,
                board: board.clone(),
            },
            eth: FakeEth {
                port,
                board: board.clone(),
            },
        }) as Arc<dyn ApiClient>
    })
}

struct FakeClient {
    health: FakeHealth,
    eth: FakeEth,
}

impl ApiClient for FakeClient {
    fn health_api(&self) -> &dyn HealthApi {
        &self.health
    }

    fn cchain_eth_api(&self) -> &dyn EthApi {
        &self.eth
    }
}

struct FakeHealth {
    port: u16,
    board: Arc<HealthBoard>,
}

#[async_trait]
impl HealthApi for FakeHealth {
    async fn health(&self) -> Result<bool> {
        *self.board.checks.lock() += 1;
        if self.board.erroring_ports.lock().contains(&self.port) {
            return Err(anyhow!("connection refused"));
        }
        let healthy = *self.board.all_healthy.lock()
            || self.board.healthy_ports.lock().contains(&self.port);
        Ok(healthy)
    }
}

struct FakeEth {
    port: u16,
    board: Arc<HealthBoard>,
}

#[async_trait]
impl EthApi for FakeEth {
    fn close(&self) {
        self.board.closed_ports.lock().push(self.port);
    }

    async fn block_number(&self) -> Result<u64> {
        Ok(0)
    }
}

/// A network wired to fresh fake boards under a temporary root.
pub struct Harness {
    pub root: TempDir,
    pub processes: Arc<ProcessBoard>,
    pub health: Arc<HealthBoard>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            root: tempfile::tempdir().unwrap(),
            processes: Arc::new(ProcessBoard::default()),
            health: HealthBoard::healthy(),
        }
    }

    pub fn options(&self) -> NetworkOptions {
        NetworkOptions::new()
            .with_root_dir(self.root.path())
            .with_health_check_interval(Duration::from_millis(10))
    }

    pub async fn start(&self, config: NetworkConfig) -> Result<LocalNetwork, NetworkError> {
        self.start_with(config, self.options()).await
    }

    pub async fn start_with(
        &self,
        config: NetworkConfig,
        options: NetworkOptions,
    ) -> Result<LocalNetwork, NetworkError> {
        LocalNetwork::with_providers(
            config,
            options,
            fake_client_fn(self.health.clone()),
            Arc::new(FakeCreator(self.processes.clone())),
        )
        .await
    }
}
