// Path: crates/forge/src/local/node.rs

use super::process::NodeProcess;
use netrunner_client::ApiClient;
use netrunner_types::{FlagKey, NodeId};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// A node that is part of a [`LocalNetwork`](super::LocalNetwork).
///
/// Cheap to clone. Clones share the process and the API client, so a handle kept
/// by a caller stays usable for queries after the node has been removed, but only
/// the network drives the process lifecycle.
#[derive(Clone)]
pub struct Node {
    pub(crate) name: String,
    pub(crate) node_id: NodeId,
    pub(crate) api_port: u16,
    pub(crate) p2p_port: u16,
    pub(crate) is_beacon: bool,
    pub(crate) dir: PathBuf,
    pub(crate) args: Vec<String>,
    pub(crate) client: Arc<dyn ApiClient>,
    pub(crate) process: Arc<Mutex<Box<dyn NodeProcess>>>,
}

impl Node {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    pub fn api_port(&self) -> u16 {
        self.api_port
    }

    pub fn p2p_port(&self) -> u16 {
        self.p2p_port
    }

    pub fn is_beacon(&self) -> bool {
        self.is_beacon
    }

    /// The node's directory under the network root.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The command line the node was launched with.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Value of `--<key>=` on the node's command line, if present.
    pub fn flag(&self, key: FlagKey) -> Option<&str> {
        let prefix = format!("--{}=", key.as_str());
        self.args.iter().find_map(|arg| arg.strip_prefix(prefix.as_str()))
    }

    pub fn client(&self) -> &dyn ApiClient {
        self.client.as_ref()
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("node_id", &self.node_id)
            .field("api_port", &self.api_port)
            .field("p2p_port", &self.p2p_port)
            .field("is_beacon", &self.is_beacon)
            .finish_non_exhaustive()
    }
}
