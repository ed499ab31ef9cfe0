//! Data types shared between CLI and core.

use std::fmt;

use serde::Serialize;

use crate::validation::Address;

/// Chains the front end knows how to target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    Anvil,
    ZkSync,
    Mainnet,
}

impl Chain {
    pub const ALL: [Chain; 3] = [Chain::Anvil, Chain::ZkSync, Chain::Mainnet];

    pub fn chain_id(&self) -> u64 {
        match self {
            Chain::Anvil => 31_337,
            Chain::ZkSync => 324,
            Chain::Mainnet => 1,
        }
    }

    /// Stable string identifier used in JSON output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Chain::Anvil => "anvil",
            Chain::ZkSync => "zksync",
            Chain::Mainnet => "mainnet",
        }
    }

    pub fn from_chain_id(id: u64) -> Option<Chain> {
        Chain::ALL.into_iter().find(|c| c.chain_id() == id)
    }
}

/// A 32-byte transaction hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxHash(pub [u8; 32]);

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Outcome of a mined transaction as reported by the chain client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
    pub success: bool,
}

/// ERC-20 `name()` / `symbol()` of the token being airdropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
}

/// A single airdrop recipient in wei.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub address: Address,
    pub amount_wei: u128,
}

/// `token.approve(spender, amount)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApproveCall {
    pub token: Address,
    pub spender: Address,
    #[serde(with = "wei_string")]
    pub amount: u128,
}

/// `tsender.airdropERC20(token, recipients, amounts, total)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AirdropCall {
    pub tsender: Address,
    pub token: Address,
    pub recipients: Vec<Address>,
    #[serde(with = "wei_list")]
    pub amounts: Vec<u128>,
    #[serde(with = "wei_string")]
    pub total: u128,
}

/// One transaction in an airdrop plan, in submission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanStep {
    Approve(ApproveCall),
    Airdrop(AirdropCall),
}

/// The constructed plan emitted by the CLI in agent mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirdropPlan {
    pub schema_version: String,
    pub chain_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain: Option<Chain>,
    pub recipient_count: usize,
    /// Aggregated amounts total as computed for display and the approval gate.
    pub total: f64,
    #[serde(with = "wei_string")]
    pub allowance: u128,
    pub approval_required: bool,
    pub steps: Vec<PlanStep>,
}

// Wei values exceed the 53-bit integer range of most JSON consumers, so they
// travel as decimal strings.
mod wei_string {
    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }
}

mod wei_list {
    use serde::ser::SerializeSeq;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(values: &[u128], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(values.len()))?;
        for value in values {
            seq.serialize_element(&value.to_string())?;
        }
        seq.end()
    }
}
