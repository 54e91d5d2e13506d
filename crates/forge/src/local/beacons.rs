// Path: crates/forge/src/local/beacons.rs

//! The bootstrap registry: addresses and identities of the beacons added so far.

use netrunner_types::NodeId;
use std::fmt;

/// An insertion-ordered list of unique strings, rendered comma-joined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BeaconList(Vec<String>);

impl BeaconList {
    /// Appends `entry` unless it is already present. Returns whether it was added.
    pub fn insert(&mut self, entry: impl Into<String>) -> bool {
        let entry = entry.into();
        if self.0.contains(&entry) {
            return false;
        }
        self.0.push(entry);
        true
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl fmt::Display for BeaconList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(","))
    }
}

/// The `--bootstrap-ips` and `--bootstrap-ids` values handed to every new node.
///
/// Only grows. Removing a beacon does not remove it from the registry.
#[derive(Debug, Clone, Default)]
pub struct BootstrapRegistry {
    ips: BeaconList,
    ids: BeaconList,
}

impl BootstrapRegistry {
    /// Records a beacon reachable at `host:p2p_port`.
    pub fn register(&mut self, host: &str, p2p_port: u16, node_id: &NodeId) {
        self.ips.insert(format!("{host}:{p2p_port}"));
        self.ids.insert(node_id.to_string());
    }

    pub fn ips(&self) -> &BeaconList {
        &self.ips
    }

    pub fn ids(&self) -> &BeaconList {
        &self.ids
    }
}
