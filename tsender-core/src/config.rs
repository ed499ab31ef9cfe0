//! Per-chain contract configuration.
//!
//! The registry is loaded from JSON keyed by decimal chain id:
//!
//! ```json
//! { "31337": { "tsender": "0x5FbDB2315678afecb367f032d93F642f64180aa3" } }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validation::Address;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("no TSender contract configured for chain id {chain_id}")]
    UnknownChain { chain_id: u64 },

    #[error("failed to read registry {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid registry JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Contracts deployed on one chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainContracts {
    pub tsender: Address,
}

/// Chain id to contract address lookup, passed explicitly wherever a
/// TSender address is needed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainRegistry {
    chains: BTreeMap<u64, ChainContracts>,
}

impl ChainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, RegistryError> {
        let json = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn with_tsender(mut self, chain_id: u64, tsender: Address) -> Self {
        self.chains.insert(chain_id, ChainContracts { tsender });
        self
    }

    pub fn tsender(&self, chain_id: u64) -> Result<Address, RegistryError> {
        self.chains
            .get(&chain_id)
            .map(|c| c.tsender)
            .ok_or(RegistryError::UnknownChain { chain_id })
    }

    pub fn chain_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.chains.keys().copied()
    }
}
