//! Core library for TSender: amount aggregation, validation, and airdrop planning.

pub mod aggregator;
pub mod config;
pub mod error;
pub mod form;
pub mod output;
pub mod parser;
pub mod plan;
pub mod submit;
pub mod types;
pub mod validation;

pub use aggregator::{compute_total, try_compute_total, AmountListError, AmountTotal};
pub use config::{ChainRegistry, RegistryError};
pub use error::{AirdropError, ClientError};
pub use form::AirdropForm;
pub use output::{
    format_total_tokens, format_total_wei, truncate_address, AgentError, OutputMode, RowIssue,
    TotalDisplay,
};
pub use parser::{parse_amount_token, parse_wei_token, split_list, AmountParseError};
pub use plan::{needs_approval, plan_airdrop, AirdropRequest};
pub use submit::{submit_airdrop, token_label, AirdropOutcome, ChainClient};
pub use types::{AirdropCall, AirdropPlan, ApproveCall, Chain, PlanStep, Receipt, TokenMetadata, TxHash};
pub use validation::{to_checksum, validate_address, Address, AddressValidationError};
