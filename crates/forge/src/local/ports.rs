// Path: crates/forge/src/local/ports.rs

//! Port assignment for new nodes.
//!
//! A port comes from the node's flags, then from its config file, and only then from
//! the operating system. Explicit ports are checked against the ports held by live
//! nodes; OS-picked ports that happen to collide with a live node are re-picked.

use netrunner_types::config::json_type_name;
use netrunner_types::{FlagKey, Flags, NetworkError};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::debug;

/// How many times an OS-picked port that collides with a live node is re-picked.
const MAX_PICK_ATTEMPTS: usize = 16;

/// Ports held by live nodes, mapped to the name of the node holding them.
pub type TakenPorts = HashMap<u16, String>;

/// Resolves the port named by `key` for node `name`.
pub fn resolve_port(
    key: FlagKey,
    name: &str,
    flags: &Flags,
    config_file: &Map<String, Value>,
    taken: &TakenPorts,
) -> Result<u16, NetworkError> {
    let explicit = match flags.get(key.as_str()) {
        Some(value) => Some(value.as_port(key.as_str())?),
        None => config_file
            .get(key.as_str())
            .map(|value| port_from_json(key, value))
            .transpose()?,
    };

    match explicit {
        Some(port) => match taken.get(&port) {
            Some(owner) => Err(NetworkError::PortConflict {
                port,
                owner: owner.clone(),
            }),
            None => Ok(port),
        },
        None => {
            let port = pick_free_port(key.as_str(), taken)?;
            debug!(node = %name, flag = %key, port, "picked free port");
            Ok(port)
        }
    }
}

/// Asks the OS for a free port that no live node holds.
pub fn pick_free_port(kind: &'static str, taken: &TakenPorts) -> Result<u16, NetworkError> {
    for _ in 0..MAX_PICK_ATTEMPTS {
        match portpicker::pick_unused_port() {
            Some(port) if !taken.contains_key(&port) => return Ok(port),
            Some(port) => debug!(port, kind, "picked port is held by a live node, retrying"),
            None => break,
        }
    }
    Err(NetworkError::NoFreePort(kind))
}

fn port_from_json(key: FlagKey, value: &Value) -> Result<u16, NetworkError> {
    let malformed = |found: String| NetworkError::MalformedFlag {
        key: key.as_str().to_string(),
        expected: "a port number",
        found,
    };
    match value {
        Value::Number(n) if !n.is_f64() => n
            .as_u64()
            .and_then(|v| u16::try_from(v).ok())
            .ok_or_else(|| malformed(format!("out-of-range int {n}"))),
        other => Err(malformed(json_type_name(other).to_string())),
    }
}
