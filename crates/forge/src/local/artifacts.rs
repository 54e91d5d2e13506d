// Path: crates/forge/src/local/artifacts.rs

//! Per-node files and command-line flags.
//!
//! Everything a node needs on disk lives in its own directory under the network root.
//! Directories are created `0o750` and files `0o600` since the directory holds the
//! node's staking key.

use super::beacons::BootstrapRegistry;
use super::{
    CCHAIN_CONFIG_DIR_NAME, CONFIG_FILE_NAME, GENESIS_FILE_NAME, STAKING_CERT_FILE_NAME,
    STAKING_KEY_FILE_NAME,
};
use netrunner_types::config::json_type_name;
use netrunner_types::{FlagKey, Flags, NetworkError, NodeConfig};
use serde_json::{Map, Value};
use std::fs::{DirBuilder, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

#[cfg(unix)]
const PRIVATE_DIR_MODE: u32 = 0o750;
#[cfg(unix)]
const PRIVATE_FILE_MODE: u32 = 0o600;

/// Where a node keeps its data and which ports it listens on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeLayout {
    pub dir: PathBuf,
    pub db_dir: PathBuf,
    pub log_dir: PathBuf,
    pub api_port: u16,
    pub p2p_port: u16,
}

/// Creates the node directory. An existing directory is reused with a warning.
pub fn create_node_dir(dir: &Path) -> Result<(), NetworkError> {
    match dir_builder(false).create(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            warn!(dir = %dir.display(), "node root directory already exists");
            Ok(())
        }
        Err(e) => Err(NetworkError::io(
            format!("error creating node directory {}", dir.display()),
            e,
        )),
    }
}

/// Resolves a directory flag from the node flags, then the config file, then `default`.
pub fn resolve_dir(
    key: FlagKey,
    flags: &Flags,
    config_file: &Map<String, Value>,
    default: PathBuf,
) -> Result<PathBuf, NetworkError> {
    if let Some(value) = flags.get(key.as_str()) {
        return value.as_string(key.as_str()).map(PathBuf::from);
    }
    match config_file.get(key.as_str()) {
        Some(Value::String(dir)) => Ok(PathBuf::from(dir)),
        Some(other) => Err(NetworkError::MalformedFlag {
            key: key.as_str().to_string(),
            expected: "string",
            found: json_type_name(other).to_string(),
        }),
        None => Ok(default),
    }
}

/// Renders the node's command line, minus the file flags appended by
/// [`write_node_files`].
///
/// The orchestrator-owned flags come first. The remaining node flags follow in key
/// order; reserved flags supplied by the caller are dropped with a warning and the
/// flags already consumed into `layout` are not repeated.
pub fn render_args(
    network_id: u32,
    layout: &NodeLayout,
    registry: &BootstrapRegistry,
    flags: &Flags,
) -> Vec<String> {
    let mut args = vec![
        FlagKey::NetworkId.render(network_id),
        FlagKey::DbDir.render(layout.db_dir.display()),
        FlagKey::LogDir.render(layout.log_dir.display()),
        FlagKey::HttpPort.render(layout.api_port),
        FlagKey::StakingPort.render(layout.p2p_port),
        FlagKey::BootstrapIps.render(registry.ips()),
        FlagKey::BootstrapIds.render(registry.ids()),
    ];

    for (name, value) in flags {
        match name.parse::<FlagKey>() {
            Ok(key) if key.is_reserved() => {
                warn!(
                    flag = %name,
                    "the flag is set by the runner; the provided value is ignored, consider removing it"
                );
            }
            Ok(FlagKey::DbDir | FlagKey::LogDir | FlagKey::HttpPort | FlagKey::StakingPort) => {}
            _ => args.push(format!("--{name}={value}")),
        }
    }
    args
}

/// Writes the node's staking credentials, config files and genesis into `dir` and
/// returns the flags pointing the node at them, in the order they were written.
pub fn write_node_files(
    dir: &Path,
    config: &NodeConfig,
    genesis: &[u8],
) -> Result<Vec<String>, NetworkError> {
    let mut args = Vec::new();

    let key_path = dir.join(STAKING_KEY_FILE_NAME);
    write_private_file(&key_path, config.staking_key.as_bytes())
        .map_err(|e| NetworkError::io("error creating/writing staking key", e))?;
    args.push(FlagKey::StakingKeyFile.render(key_path.display()));

    let cert_path = dir.join(STAKING_CERT_FILE_NAME);
    write_private_file(&cert_path, config.staking_cert.as_bytes())
        .map_err(|e| NetworkError::io("error creating/writing staking cert", e))?;
    args.push(FlagKey::StakingCertFile.render(cert_path.display()));

    if let Some(config_file) = non_empty(config.config_file.as_deref()) {
        let path = dir.join(CONFIG_FILE_NAME);
        write_private_file(&path, config_file.as_bytes())
            .map_err(|e| NetworkError::io("error creating/writing config file", e))?;
        args.push(FlagKey::ConfigFile.render(path.display()));
    }

    let genesis_path = dir.join(GENESIS_FILE_NAME);
    write_private_file(&genesis_path, genesis)
        .map_err(|e| NetworkError::io("error creating/writing genesis file", e))?;
    args.push(FlagKey::GenesisFile.render(genesis_path.display()));

    if let Some(cchain_config) = non_empty(config.c_chain_config_file.as_deref()) {
        let path = dir.join(CCHAIN_CONFIG_DIR_NAME).join(CONFIG_FILE_NAME);
        write_private_file(&path, cchain_config.as_bytes())
            .map_err(|e| NetworkError::io("error creating/writing C-Chain config file", e))?;
        args.push(FlagKey::ChainConfigDir.render(dir.display()));
    }

    Ok(args)
}

/// Writes `contents` to `path`, creating missing parent directories.
pub fn write_private_file(path: &Path, contents: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        dir_builder(true).create(parent)?;
    }
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(PRIVATE_FILE_MODE);
    }
    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.flush()
}

fn dir_builder(recursive: bool) -> DirBuilder {
    let mut builder = DirBuilder::new();
    builder.recursive(recursive);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(PRIVATE_DIR_MODE);
    }
    builder
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
