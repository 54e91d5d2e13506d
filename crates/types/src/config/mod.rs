// Path: crates/types/src/config/mod.rs

//! Shared configuration structures for a local network.
//!
//! A [`NetworkConfig`] is the only input the orchestrator needs: a genesis document,
//! global flags and an ordered list of [`NodeConfig`]s. Configurations are usually
//! loaded from JSON and must pass [`NetworkConfig::validate`] before a network is
//! created from them.

use crate::app::network_id_from_genesis;
use crate::error::NetworkError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub mod flags;
pub use flags::*;

/// Configuration of a whole local network.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    /// Human-readable network name.
    #[serde(default)]
    pub name: String,
    /// The genesis document handed to every node.
    pub genesis: String,
    /// Flags applied to every node unless the node sets the same flag itself.
    #[serde(default)]
    pub flags: Flags,
    /// The nodes to start, in order. Beacons are started before non-beacons.
    #[serde(default)]
    pub node_configs: Vec<NodeConfig>,
    /// Log level hint for the runner itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl NetworkConfig {
    /// Loads a network configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, NetworkError> {
        let raw = std::fs::read(path)
            .map_err(|e| NetworkError::io(format!("couldn't read {}", path.display()), e))?;
        serde_json::from_slice(&raw).map_err(|e| {
            NetworkError::InvalidConfig(format!("couldn't parse {}: {e}", path.display()))
        })
    }

    /// The network identifier declared in the genesis document.
    pub fn network_id(&self) -> Result<u32, NetworkError> {
        network_id_from_genesis(self.genesis.as_bytes())
    }

    /// Checks the configuration for structural errors before any node is started.
    pub fn validate(&self) -> Result<(), NetworkError> {
        if self.genesis.trim().is_empty() {
            return Err(NetworkError::InvalidConfig("no genesis given".to_string()));
        }
        self.network_id()?;

        let mut names = HashSet::new();
        for (i, node) in self.node_configs.iter().enumerate() {
            node.validate()
                .map_err(|e| NetworkError::InvalidConfig(format!("node config {i}: {e}")))?;
            if let Some(name) = node.name.as_deref() {
                if !names.insert(name) {
                    return Err(NetworkError::DuplicateName(name.to_string()));
                }
            }
        }

        if !self.node_configs.is_empty() && !self.node_configs.iter().any(|n| n.is_beacon) {
            return Err(NetworkError::InvalidConfig(
                "beacon nodes not given".to_string(),
            ));
        }
        Ok(())
    }

    /// Points every node at the given binary.
    pub fn set_binary_path(&mut self, binary_path: &Path) {
        for node in &mut self.node_configs {
            node.impl_specific_config.binary_path = binary_path.to_path_buf();
        }
    }
}

/// Configuration of a single node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeConfig {
    /// Unique node name. Assigned by the orchestrator when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Node-level flags. These win over the network's global flags.
    #[serde(default)]
    pub flags: Flags,
    /// Contents of the node's JSON config file, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_file: Option<String>,
    /// PEM-encoded staking private key.
    pub staking_key: String,
    /// PEM-encoded staking certificate.
    pub staking_cert: String,
    /// Contents of the C-Chain config file, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub c_chain_config_file: Option<String>,
    /// Whether other nodes should bootstrap from this node.
    #[serde(default)]
    pub is_beacon: bool,
    /// Settings specific to running the node as a local process.
    pub impl_specific_config: LocalNodeConfig,
}

impl NodeConfig {
    /// Checks that the node carries everything needed to start it.
    pub fn validate(&self) -> Result<(), NetworkError> {
        if self.staking_key.trim().is_empty() {
            return Err(NetworkError::InvalidConfig("no staking key given".to_string()));
        }
        if self.staking_cert.trim().is_empty() {
            return Err(NetworkError::InvalidConfig(
                "no staking cert given".to_string(),
            ));
        }
        if self.impl_specific_config.binary_path.as_os_str().is_empty() {
            return Err(NetworkError::InvalidConfig(
                "no binary path given".to_string(),
            ));
        }
        self.config_file_map()?;
        Ok(())
    }

    /// Parses the config file payload into a JSON object.
    ///
    /// Returns an empty map when no config file was given.
    pub fn config_file_map(&self) -> Result<Map<String, Value>, NetworkError> {
        match self.config_file.as_deref() {
            None | Some("") => Ok(Map::new()),
            Some(raw) => match serde_json::from_str::<Value>(raw) {
                Ok(Value::Object(map)) => Ok(map),
                Ok(other) => Err(NetworkError::InvalidConfig(format!(
                    "config file must be a JSON object, got {}",
                    json_type_name(&other)
                ))),
                Err(e) => Err(NetworkError::InvalidConfig(format!(
                    "couldn't unmarshal config file: {e}"
                ))),
            },
        }
    }

    /// Returns the node name, or an empty string if none has been assigned yet.
    pub fn name_or_default(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

/// Settings for running a node as a local OS process.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LocalNodeConfig {
    /// Path to the node binary.
    pub binary_path: PathBuf,
    /// Forward the node's stdout to the runner's stdout.
    #[serde(default)]
    pub redirect_stdout: bool,
    /// Forward the node's stderr to the runner's stderr.
    #[serde(default)]
    pub redirect_stderr: bool,
}

impl LocalNodeConfig {
    /// A config that runs `binary_path` without redirecting its output.
    pub fn new(binary_path: impl Into<PathBuf>) -> Self {
        Self {
            binary_path: binary_path.into(),
            ..Default::default()
        }
    }
}

/// A short description of a JSON value's type, used in error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
