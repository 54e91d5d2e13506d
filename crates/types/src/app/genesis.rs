// Path: crates/types/src/app/genesis.rs

use crate::error::NetworkError;
use serde::Deserialize;

#[derive(Deserialize)]
struct GenesisHeader {
    #[serde(rename = "networkID")]
    network_id: u32,
}

/// Reads the network identifier out of a JSON genesis document.
///
/// Only the top-level `networkID` field is inspected; the rest of the document is
/// opaque to the runner and is handed to every node verbatim.
pub fn network_id_from_genesis(genesis: &[u8]) -> Result<u32, NetworkError> {
    let header: GenesisHeader = serde_json::from_slice(genesis).map_err(|e| {
        NetworkError::InvalidConfig(format!("couldn't get network ID from genesis: {e}"))
    })?;
    Ok(header.network_id)
}
