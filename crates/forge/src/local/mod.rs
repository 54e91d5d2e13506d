// Path: crates/forge/src/local/mod.rs

//! A local network whose nodes run as OS processes on this machine.
//!
//! [`LocalNetwork`] is the orchestrator. It writes each node's staking credentials,
//! genesis and config files to a private per-node directory, renders the node's
//! command line (including the bootstrap list accumulated from previously added
//! beacons), launches the process through a [`NodeProcessCreator`] and tracks the
//! resulting [`Node`] until it is removed or the network is stopped.

pub mod artifacts;
pub mod beacons;
pub mod health;
pub mod network;
pub mod node;
pub mod options;
pub mod ports;
pub mod process;

pub use beacons::{BeaconList, BootstrapRegistry};
pub use network::{LocalNetwork, NetworkStatus};
pub use node::Node;
pub use options::NetworkOptions;
pub use process::{
    stdio_writer, ColorPicker, LocalProcess, LocalProcessCreator, NodeProcess,
    NodeProcessCreator, OutputWriter,
};

use std::time::Duration;

/// Prefix of auto-generated node names (`node-0`, `node-1`, ...).
pub const DEFAULT_NODE_NAME_PREFIX: &str = "node-";
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const STAKING_KEY_FILE_NAME: &str = "staking.key";
pub const STAKING_CERT_FILE_NAME: &str = "staking.crt";
pub const GENESIS_FILE_NAME: &str = "genesis.json";
/// Subdirectory of a node's directory holding the C-Chain config file.
pub const CCHAIN_CONFIG_DIR_NAME: &str = "C";
pub const LOGS_DIR_NAME: &str = "logs";
/// Host used for bootstrap addresses and API clients.
pub const LOCALHOST: &str = "127.0.0.1";

pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_HEALTH_CHECK_INTERVAL: Duration = Duration::from_secs(3);
