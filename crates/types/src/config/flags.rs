// Path: crates/types/src/config/flags.rs

//! Typed command-line flags.
//!
//! Flags are kept as a map from flag name to a small tagged union. Values outside
//! bool, int and string (floats, large unsigned ints, arrays, null) are kept as opaque
//! JSON and rendered verbatim. The names the orchestrator itself reads or writes form the closed
//! [`FlagKey`] enumeration; every other name is passed through to the node verbatim.

use crate::error::NetworkError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A set of flags keyed by flag name (without the leading `--`).
///
/// A `BTreeMap` keeps flag rendering deterministic across runs.
pub type Flags = BTreeMap<String, FlagValue>;

/// A single flag value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    /// A boolean flag.
    Bool(bool),
    /// An integer flag.
    Int(i64),
    /// A string flag.
    String(String),
    /// Any other JSON value, passed to the node as its JSON text.
    Other(serde_json::Value),
}

impl FlagValue {
    /// A short description of the value type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::String(_) => "string",
            Self::Other(v) => super::json_type_name(v),
        }
    }

    /// Interprets the value as a TCP port.
    pub fn as_port(&self, key: &str) -> Result<u16, NetworkError> {
        match self {
            Self::Int(v) => u16::try_from(*v).map_err(|_| NetworkError::MalformedFlag {
                key: key.to_string(),
                expected: "a port number",
                found: format!("out-of-range int {v}"),
            }),
            Self::Other(serde_json::Value::Number(n)) if n.is_u64() => {
                Err(NetworkError::MalformedFlag {
                    key: key.to_string(),
                    expected: "a port number",
                    found: format!("out-of-range int {n}"),
                })
            }
            other => Err(NetworkError::MalformedFlag {
                key: key.to_string(),
                expected: "int",
                found: other.type_name().to_string(),
            }),
        }
    }

    /// Interprets the value as a string.
    pub fn as_string(&self, key: &str) -> Result<&str, NetworkError> {
        match self {
            Self::String(s) => Ok(s),
            other => Err(NetworkError::MalformedFlag {
                key: key.to_string(),
                expected: "string",
                found: other.type_name().to_string(),
            }),
        }
    }
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::String(v) => f.write_str(v),
            Self::Other(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for FlagValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for FlagValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u16> for FlagValue {
    fn from(v: u16) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<&str> for FlagValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for FlagValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

/// The flags the orchestrator renders or reads itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FlagKey {
    /// `--network-id`
    NetworkId,
    /// `--db-dir`
    DbDir,
    /// `--log-dir`
    LogDir,
    /// `--http-port`
    HttpPort,
    /// `--staking-port`
    StakingPort,
    /// `--bootstrap-ips`
    BootstrapIps,
    /// `--bootstrap-ids`
    BootstrapIds,
    /// `--staking-tls-key-file`
    StakingKeyFile,
    /// `--staking-tls-cert-file`
    StakingCertFile,
    /// `--config-file`
    ConfigFile,
    /// `--genesis`
    GenesisFile,
    /// `--chain-config-dir`
    ChainConfigDir,
}

impl FlagKey {
    /// Every recognized flag.
    pub const ALL: [FlagKey; 12] = [
        FlagKey::NetworkId,
        FlagKey::DbDir,
        FlagKey::LogDir,
        FlagKey::HttpPort,
        FlagKey::StakingPort,
        FlagKey::BootstrapIps,
        FlagKey::BootstrapIds,
        FlagKey::StakingKeyFile,
        FlagKey::StakingCertFile,
        FlagKey::ConfigFile,
        FlagKey::GenesisFile,
        FlagKey::ChainConfigDir,
    ];

    /// The flag name as passed on the command line, without the leading `--`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NetworkId => "network-id",
            Self::DbDir => "db-dir",
            Self::LogDir => "log-dir",
            Self::HttpPort => "http-port",
            Self::StakingPort => "staking-port",
            Self::BootstrapIps => "bootstrap-ips",
            Self::BootstrapIds => "bootstrap-ids",
            Self::StakingKeyFile => "staking-tls-key-file",
            Self::StakingCertFile => "staking-tls-cert-file",
            Self::ConfigFile => "config-file",
            Self::GenesisFile => "genesis",
            Self::ChainConfigDir => "chain-config-dir",
        }
    }

    /// Flags the orchestrator always sets itself; a caller-supplied value is ignored.
    pub fn is_reserved(&self) -> bool {
        matches!(
            self,
            Self::NetworkId | Self::BootstrapIps | Self::BootstrapIds
        )
    }

    /// Renders `--<name>=<value>`.
    pub fn render(&self, value: impl fmt::Display) -> String {
        format!("--{}={}", self.as_str(), value)
    }
}

impl fmt::Display for FlagKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlagKey {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|key| key.as_str() == s)
            .copied()
            .ok_or(())
    }
}
