use thiserror::Error;

use crate::config::RegistryError;
use crate::output::RowIssue;

/// Failure reported by a [`ChainClient`](crate::submit::ChainClient) implementation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("chain client error: {message}")]
pub struct ClientError {
    pub message: String,
}

impl ClientError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AirdropError {
    #[error("airdrop form is incomplete: {0} is empty")]
    MissingInput(&'static str),

    #[error("airdrop validation failed with {} issue(s)", .0.len())]
    Validation(Vec<RowIssue>),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("approval transaction {tx_hash} reverted")]
    ApprovalReverted { tx_hash: String },
}

impl AirdropError {
    /// Per-entry issues, when the failure came from input validation.
    pub fn issues(&self) -> &[RowIssue] {
        match self {
            AirdropError::Validation(issues) => issues,
            _ => &[],
        }
    }
}

pub type Result<T> = std::result::Result<T, AirdropError>;
