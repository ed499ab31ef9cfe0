//! Approve-then-airdrop submission over a caller-supplied chain client.

use tracing::{info, warn};

use crate::error::{AirdropError, ClientError, Result};
use crate::plan::AirdropRequest;
use crate::types::{AirdropCall, Receipt, TokenMetadata, TxHash};
use crate::validation::Address;

/// Wallet and RPC operations the airdrop flow depends on.
///
/// Implementations own signing, broadcasting, and receipt polling.
pub trait ChainClient {
    /// ERC-20 `allowance(owner, spender)` on `token`.
    fn allowance(
        &self,
        token: &Address,
        owner: &Address,
        spender: &Address,
    ) -> std::result::Result<u128, ClientError>;

    fn token_metadata(&self, token: &Address) -> std::result::Result<TokenMetadata, ClientError>;

    /// Send ERC-20 `approve(spender, amount)` on `token`.
    fn approve(
        &mut self,
        token: &Address,
        spender: &Address,
        amount: u128,
    ) -> std::result::Result<TxHash, ClientError>;

    /// Block until `hash` is mined.
    fn wait_for_receipt(&mut self, hash: &TxHash) -> std::result::Result<Receipt, ClientError>;

    /// Send `airdropERC20` to the TSender contract named in `call`.
    fn airdrop_erc20(&mut self, call: &AirdropCall) -> std::result::Result<TxHash, ClientError>;
}

/// Label for the token being airdropped: `"Name (SYMBOL)"`, or the
/// checksummed address when the metadata read fails.
pub fn token_label<C: ChainClient>(client: &C, token: &Address) -> String {
    match client.token_metadata(token) {
        Ok(meta) => format!("{} ({})", meta.name, meta.symbol),
        Err(err) => {
            warn!(token = %token, error = %err, "token metadata unavailable");
            token.to_checksum()
        }
    }
}

/// What [`submit_airdrop`] sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AirdropOutcome {
    pub allowance: u128,
    pub approval: Option<Receipt>,
    pub airdrop_tx: TxHash,
}

/// Submit `request` on behalf of `owner`.
///
/// Reads the current allowance; when it does not cover the total, sends an
/// approval for the total and waits for it to be mined before sending the
/// airdrop. A reverted approval stops the flow.
pub fn submit_airdrop<C: ChainClient>(
    client: &mut C,
    owner: &Address,
    request: &AirdropRequest,
) -> Result<AirdropOutcome> {
    let allowance = client.allowance(&request.token, owner, &request.tsender)?;
    info!(
        token = %request.token,
        recipients = request.recipients.len(),
        total_wei = %request.total_wei,
        allowance = %allowance,
        "submitting airdrop"
    );

    let approval = if request.needs_approval(allowance) {
        let call = request.approve_call();
        let hash = client.approve(&call.token, &call.spender, call.amount)?;
        info!(tx = %hash, amount = %call.amount, "approval sent");

        let receipt = client.wait_for_receipt(&hash)?;
        if !receipt.success {
            warn!(tx = %hash, block = receipt.block_number, "approval reverted");
            return Err(AirdropError::ApprovalReverted {
                tx_hash: hash.to_string(),
            });
        }
        info!(tx = %hash, block = receipt.block_number, "approval mined");
        Some(receipt)
    } else {
        None
    };

    let airdrop_tx = client.airdrop_erc20(&request.airdrop_call())?;
    info!(tx = %airdrop_tx, "airdrop sent");

    Ok(AirdropOutcome {
        allowance,
        approval,
        airdrop_tx,
    })
}
