// Path: crates/types/src/error/mod.rs
//! The error type surfaced by every network orchestrator operation.

use thiserror::Error;

/// Errors returned by the local network orchestrator.
///
/// The variants fall into four families: state errors (`Stopped`), validation
/// errors (malformed flags, duplicate or unknown names, invalid configuration),
/// resource errors (filesystem, ports, process launch) and liveness errors (health
/// timeouts and process exits). None of them is retried inside the orchestrator.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// The operation was attempted against a network that has been stopped.
    #[error("network stopped")]
    Stopped,
    /// A node with the same name is already part of the network.
    #[error("repeated node name {0}")]
    DuplicateName(String),
    /// No node with the given name is part of the network.
    #[error("node {0:?} not found in network")]
    NotFound(String),
    /// A recognized flag carried a value of the wrong type or range.
    #[error("expected flag {key:?} to be {expected} but got {found}")]
    MalformedFlag {
        /// The flag name.
        key: String,
        /// A description of the expected value type.
        expected: &'static str,
        /// A description of the value that was supplied.
        found: String,
    },
    /// A requested port is already assigned to a live node.
    #[error("port {port} is already in use by node {owner:?}")]
    PortConflict {
        /// The conflicting port.
        port: u16,
        /// The name of the live node holding the port.
        owner: String,
    },
    /// The operating system did not hand out a usable free port.
    #[error("couldn't get a free {0} port")]
    NoFreePort(&'static str),
    /// The network or node configuration is invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The node identity could not be derived from its staking credentials.
    #[error("couldn't create node ID: {0}")]
    Identity(String),
    /// A filesystem operation failed.
    #[error("{context}: {source}")]
    Io {
        /// What the orchestrator was doing when the error occurred.
        context: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// The node process could not be created or started.
    #[error("couldn't start node {name:?}: {source}")]
    NodeStart {
        /// The node name.
        name: String,
        /// The error reported by the process provider.
        #[source]
        source: anyhow::Error,
    },
    /// The termination signal could not be delivered to the node process.
    #[error("error sending SIGTERM to node {name}: {source}")]
    NodeStop {
        /// The node name.
        name: String,
        /// The error reported by the process provider.
        #[source]
        source: anyhow::Error,
    },
    /// The node process exited with an error.
    #[error("node {name:?} stopped with error: {source}")]
    NodeExit {
        /// The node name.
        name: String,
        /// The error reported while waiting for the process to exit.
        #[source]
        source: anyhow::Error,
    },
    /// A node from the initial network config could not be added; the network was
    /// torn down.
    #[error("error adding node {name}: {source}")]
    AddNode {
        /// The node name as given in the config, or its default.
        name: String,
        /// Why the node could not be added.
        #[source]
        source: Box<NetworkError>,
    },
    /// The node did not report healthy before the caller's deadline.
    #[error("node {0:?} failed to become healthy within timeout")]
    HealthTimeout(String),
    /// The stop deadline elapsed before every node was removed.
    #[error("stop deadline exceeded before all nodes were removed")]
    StopDeadline,
    /// One or more nodes failed to shut down cleanly during `stop`.
    #[error("{}", describe_all(.0))]
    StopFailed(Vec<NetworkError>),
}

impl NetworkError {
    /// Convenience constructor for [`NetworkError::Io`].
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Returns `true` if this is the [`NetworkError::Stopped`] state error.
    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped)
    }

    /// A short, stable label for the error family, suitable for metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::DuplicateName(_) => "duplicate_name",
            Self::NotFound(_) => "not_found",
            Self::MalformedFlag { .. } => "malformed_flag",
            Self::PortConflict { .. } => "port_conflict",
            Self::NoFreePort(_) => "no_free_port",
            Self::InvalidConfig(_) => "invalid_config",
            Self::Identity(_) => "identity",
            Self::Io { .. } => "io",
            Self::NodeStart { .. } => "node_start",
            Self::NodeStop { .. } => "node_stop",
            Self::NodeExit { .. } => "node_exit",
            Self::AddNode { .. } => "add_node",
            Self::HealthTimeout(_) => "health_timeout",
            Self::StopDeadline => "stop_deadline",
            Self::StopFailed(_) => "stop_failed",
        }
    }
}

fn describe_all(errors: &[NetworkError]) -> String {
    let details: Vec<String> = errors.iter().map(ToString::to_string).collect();
    format!(
        "{} node(s) failed to stop cleanly: {}",
        errors.len(),
        details.join("; ")
    )
}
