// Path: crates/forge/src/local/network.rs

//! The local network orchestrator.

use super::artifacts::{self, NodeLayout};
use super::beacons::BootstrapRegistry;
use super::health;
use super::node::Node;
use super::options::NetworkOptions;
use super::ports::{self, TakenPorts};
use super::process::{LocalProcessCreator, NodeProcessCreator};
use super::{DEFAULT_NODE_NAME_PREFIX, LOCALHOST, LOGS_DIR_NAME};
use netrunner_client::{new_http_api_client_fn, NewApiClientFn};
use netrunner_types::{FlagKey, Flags, NetworkConfig, NetworkError, NodeConfig, NodeId};
use std::collections::btree_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tempfile::TempDir;
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Lifecycle state of a [`LocalNetwork`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkStatus {
    Running,
    /// `stop` is removing nodes.
    Stopping,
    Stopped,
}

/// Where node directories are created.
#[derive(Debug)]
enum RootDir {
    Persistent(PathBuf),
    /// Removed when the network is dropped.
    Temporary(TempDir),
}

impl RootDir {
    fn new(dir: Option<PathBuf>) -> Result<Self, NetworkError> {
        match dir {
            Some(dir) => {
                std::fs::create_dir_all(&dir).map_err(|e| {
                    NetworkError::io(
                        format!("error creating root directory {}", dir.display()),
                        e,
                    )
                })?;
                Ok(Self::Persistent(dir))
            }
            None => tempfile::Builder::new()
                .prefix("netrunner-")
                .tempdir()
                .map(Self::Temporary)
                .map_err(|e| NetworkError::io("error creating temporary root directory", e)),
        }
    }

    fn path(&self) -> &Path {
        match self {
            Self::Persistent(path) => path,
            Self::Temporary(dir) => dir.path(),
        }
    }
}

/// Everything guarded by the network lock.
#[derive(Debug)]
struct NetworkState {
    status: NetworkStatus,
    nodes: HashMap<String, Node>,
    registry: BootstrapRegistry,
    /// Suffix of the next auto-generated node name.
    next_node_suffix: u64,
}

impl NetworkState {
    fn ensure_running(&self) -> Result<(), NetworkError> {
        match self.status {
            NetworkStatus::Running => Ok(()),
            NetworkStatus::Stopping | NetworkStatus::Stopped => Err(NetworkError::Stopped),
        }
    }

    fn taken_ports(&self) -> TakenPorts {
        let mut taken = TakenPorts::new();
        for node in self.nodes.values() {
            taken.insert(node.api_port, node.name.clone());
            taken.insert(node.p2p_port, node.name.clone());
        }
        taken
    }
}

/// A network of nodes running as local processes.
///
/// Mutating operations (`add_node`, `remove_node`, `stop`) hold the exclusive lock for
/// their whole duration; queries and the start of `healthy` share it. Once stopped, a
/// network stays stopped and every operation fails with [`NetworkError::Stopped`].
pub struct LocalNetwork {
    network_id: u32,
    genesis: Vec<u8>,
    flags: Flags,
    root_dir: RootDir,
    options: NetworkOptions,
    new_api_client: NewApiClientFn,
    process_creator: Arc<dyn NodeProcessCreator>,
    closed: CancellationToken,
    state: RwLock<NetworkState>,
}

impl LocalNetwork {
    /// Creates a network whose nodes are child processes queried over HTTP, and starts
    /// the nodes in `config`.
    pub async fn new(config: NetworkConfig, options: NetworkOptions) -> Result<Self, NetworkError> {
        Self::with_providers(
            config,
            options,
            new_http_api_client_fn(),
            Arc::new(LocalProcessCreator::new()),
        )
        .await
    }

    /// Creates a network with the given API client factory and process creator, and
    /// starts the nodes in `config`: beacons first, then the rest, each group in
    /// config order.
    ///
    /// If any node fails to start, the nodes started so far are stopped and the error
    /// is returned wrapped in [`NetworkError::AddNode`] with the failing node's name.
    pub async fn with_providers(
        config: NetworkConfig,
        options: NetworkOptions,
        new_api_client: NewApiClientFn,
        process_creator: Arc<dyn NodeProcessCreator>,
    ) -> Result<Self, NetworkError> {
        config.validate()?;
        let network_id = config.network_id()?;
        let root_dir = RootDir::new(options.root_dir.clone())?;
        info!(
            network = %config.name,
            network_id,
            nodes = config.node_configs.len(),
            root = %root_dir.path().display(),
            "creating network"
        );

        let network = Self {
            network_id,
            genesis: config.genesis.into_bytes(),
            flags: config.flags,
            root_dir,
            options,
            new_api_client,
            process_creator,
            closed: CancellationToken::new(),
            state: RwLock::new(NetworkState {
                status: NetworkStatus::Running,
                nodes: HashMap::new(),
                registry: BootstrapRegistry::default(),
                next_node_suffix: 0,
            }),
        };

        let (beacons, others): (Vec<_>, Vec<_>) =
            config.node_configs.into_iter().partition(|n| n.is_beacon);
        for node_config in beacons.into_iter().chain(others) {
            let name = node_config.name_or_default().to_string();
            if let Err(e) = network.add_node(node_config).await {
                error!(node = %name, error = %e, "error adding node");
                if let Err(stop_err) = network.stop(CancellationToken::new()).await {
                    debug!(error = %stop_err, "error stopping network");
                }
                return Err(NetworkError::AddNode {
                    name,
                    source: Box::new(e),
                });
            }
        }
        Ok(network)
    }

    pub fn network_id(&self) -> u32 {
        self.network_id
    }

    /// The directory holding every node's directory.
    pub fn root_dir(&self) -> &Path {
        self.root_dir.path()
    }

    /// A token that is cancelled once the network has stopped.
    pub fn closed(&self) -> CancellationToken {
        self.closed.clone()
    }

    pub async fn status(&self) -> NetworkStatus {
        self.state.read().await.status
    }

    /// Adds a node and starts its process.
    ///
    /// Global flags are applied where the node does not set the flag itself. An unnamed
    /// node is named `node-<n>`. Returns a handle to the running node.
    ///
    /// A beacon joins the bootstrap registry as soon as its identity is derived, after its
    /// own flags are rendered and before its files are written and its process launched.
    /// A failed launch leaves no node in the table but does not undo the registration.
    pub async fn add_node(&self, config: NodeConfig) -> Result<Node, NetworkError> {
        let mut state = self.state.write().await;
        let result = self.add_node_locked(&mut state, config);
        if let Err(e) = &result {
            self.options.metrics.inc_node_failures(e.kind());
        }
        result
    }

    fn add_node_locked(
        &self,
        state: &mut NetworkState,
        mut config: NodeConfig,
    ) -> Result<Node, NetworkError> {
        state.ensure_running()?;

        for (flag, value) in &self.flags {
            match config.flags.entry(flag.clone()) {
                Entry::Vacant(entry) => {
                    entry.insert(value.clone());
                }
                Entry::Occupied(entry) => info!(
                    flag = %flag,
                    node_value = %entry.get(),
                    network_value = %value,
                    "not overwriting node config flag with network config flag"
                ),
            }
        }

        let name = match config.name.take().filter(|n| !n.is_empty()) {
            Some(name) => name,
            None => {
                let name = format!("{DEFAULT_NODE_NAME_PREFIX}{}", state.next_node_suffix);
                state.next_node_suffix += 1;
                name
            }
        };
        if state.nodes.contains_key(&name) {
            return Err(NetworkError::DuplicateName(name));
        }
        config.name = Some(name.clone());

        let dir = self.root_dir.path().join(&name);
        artifacts::create_node_dir(&dir)?;

        let config_file = config.config_file_map()?;
        let db_dir =
            artifacts::resolve_dir(FlagKey::DbDir, &config.flags, &config_file, dir.clone())?;
        let log_dir = artifacts::resolve_dir(
            FlagKey::LogDir,
            &config.flags,
            &config_file,
            dir.join(LOGS_DIR_NAME),
        )?;

        let mut taken = state.taken_ports();
        let api_port =
            ports::resolve_port(FlagKey::HttpPort, &name, &config.flags, &config_file, &taken)?;
        taken.insert(api_port, name.clone());
        let p2p_port = ports::resolve_port(
            FlagKey::StakingPort,
            &name,
            &config.flags,
            &config_file,
            &taken,
        )?;

        let layout = NodeLayout {
            dir,
            db_dir,
            log_dir,
            api_port,
            p2p_port,
        };
        let mut args =
            artifacts::render_args(self.network_id, &layout, &state.registry, &config.flags);

        let node_id = NodeId::from_staking_pem(
            config.staking_key.as_bytes(),
            config.staking_cert.as_bytes(),
        )?;

        info!(
            node = %name,
            node_id = %node_id,
            dir = %layout.dir.display(),
            db_dir = %layout.db_dir.display(),
            log_dir = %layout.log_dir.display(),
            api_port,
            p2p_port,
            "adding node"
        );

        if config.is_beacon {
            state.registry.register(LOCALHOST, p2p_port, &node_id);
        }

        args.extend(artifacts::write_node_files(&layout.dir, &config, &self.genesis)?);

        let binary = config.impl_specific_config.binary_path.display().to_string();
        debug!(node = %name, binary = %binary, args = ?args, "starting node");
        let mut process = self
            .process_creator
            .new_node_process(&config, &args)
            .map_err(|source| NetworkError::NodeStart {
                name: name.clone(),
                source,
            })?;
        process.start().map_err(|source| NetworkError::NodeStart {
            name: name.clone(),
            source: source.context(format!("could not execute {binary} {}", args.join(" "))),
        })?;

        let node = Node {
            name: name.clone(),
            node_id,
            api_port,
            p2p_port,
            is_beacon: config.is_beacon,
            dir: layout.dir,
            args,
            client: (self.new_api_client)(LOCALHOST, api_port),
            process: Arc::new(Mutex::new(process)),
        };
        state.nodes.insert(name, node.clone());
        self.options.metrics.inc_nodes_added();
        self.options.metrics.set_live_nodes(state.nodes.len());
        Ok(node)
    }

    /// Stops the named node and removes it from the network.
    ///
    /// The node is removed even if it fails to stop cleanly; the failure is returned.
    pub async fn remove_node(&self, name: &str) -> Result<(), NetworkError> {
        let mut state = self.state.write().await;
        let result = match state.ensure_running() {
            Ok(()) => self.remove_node_locked(&mut state, name).await,
            Err(e) => Err(e),
        };
        if let Err(e) = &result {
            self.options.metrics.inc_node_failures(e.kind());
        }
        result
    }

    async fn remove_node_locked(
        &self,
        state: &mut NetworkState,
        name: &str,
    ) -> Result<(), NetworkError> {
        debug!(node = %name, "removing node");
        let node = state
            .nodes
            .remove(name)
            .ok_or_else(|| NetworkError::NotFound(name.to_string()))?;
        self.options.metrics.inc_nodes_removed();
        self.options.metrics.set_live_nodes(state.nodes.len());

        // The C-Chain client holds connections to the node; release them first.
        node.client.cchain_eth_api().close();

        let mut process = node.process.lock().await;
        process.stop().map_err(|source| NetworkError::NodeStop {
            name: name.to_string(),
            source,
        })?;
        process.wait().await.map_err(|source| NetworkError::NodeExit {
            name: name.to_string(),
            source,
        })?;
        Ok(())
    }

    /// Returns a handle to the named node.
    pub async fn get_node(&self, name: &str) -> Result<Node, NetworkError> {
        let state = self.state.read().await;
        state.ensure_running()?;
        state
            .nodes
            .get(name)
            .cloned()
            .ok_or_else(|| NetworkError::NotFound(name.to_string()))
    }

    /// Returns the names of all nodes, in no particular order.
    pub async fn get_node_names(&self) -> Result<Vec<String>, NetworkError> {
        let state = self.state.read().await;
        state.ensure_running()?;
        Ok(state.nodes.keys().cloned().collect())
    }

    /// Returns handles to all nodes, keyed by name.
    pub async fn get_all_nodes(&self) -> Result<HashMap<String, Node>, NetworkError> {
        let state = self.state.read().await;
        state.ensure_running()?;
        Ok(state.nodes.clone())
    }

    /// Waits until every node reports healthy.
    ///
    /// Fails with [`NetworkError::HealthTimeout`] when `ctx` is cancelled first, and with
    /// [`NetworkError::Stopped`] if the network stops while waiting.
    pub async fn healthy(&self, ctx: CancellationToken) -> Result<(), NetworkError> {
        let nodes: Vec<Node> = {
            let state = self.state.read().await;
            state.ensure_running()?;
            state.nodes.values().cloned().collect()
        };
        info!(nodes = nodes.len(), "waiting for all nodes to report healthy");

        let started = Instant::now();
        let result = health::wait_all_healthy(
            nodes,
            self.closed.clone(),
            ctx,
            self.options.health_check_interval,
        )
        .await;
        self.options
            .metrics
            .observe_health_wait(started.elapsed().as_secs_f64());
        if let Err(e) = &result {
            self.options.metrics.inc_node_failures(e.kind());
        }
        result
    }

    /// Stops every node and closes the network.
    ///
    /// Nodes are removed one at a time until all are gone, `ctx` is cancelled or the
    /// stop timeout elapses. In the last two cases the remaining nodes stay in the
    /// network, which keeps running, and [`NetworkError::StopDeadline`] is returned.
    /// Otherwise the network is closed and every per-node failure is reported in
    /// [`NetworkError::StopFailed`].
    pub async fn stop(&self, ctx: CancellationToken) -> Result<(), NetworkError> {
        let mut state = self.state.write().await;
        if state.status != NetworkStatus::Running {
            debug!("stop() called multiple times");
            return Err(NetworkError::Stopped);
        }
        state.status = NetworkStatus::Stopping;

        let deadline = Instant::now() + self.options.stop_timeout;
        let names: Vec<String> = state.nodes.keys().cloned().collect();
        let mut errors = Vec::new();
        for name in names {
            if ctx.is_cancelled() || Instant::now() >= deadline {
                state.status = NetworkStatus::Running;
                return Err(NetworkError::StopDeadline);
            }
            if let Err(e) = self.remove_node_locked(&mut state, &name).await {
                error!(node = %name, error = %e, "error stopping node");
                self.options.metrics.inc_node_failures(e.kind());
                errors.push(e);
            }
        }

        state.status = NetworkStatus::Stopped;
        self.closed.cancel();
        info!(failures = errors.len(), "done stopping network");
        if errors.is_empty() {
            Ok(())
        } else {
            Err(NetworkError::StopFailed(errors))
        }
    }
}
