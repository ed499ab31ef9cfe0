//! Airdrop request validation and transaction planning.

use tracing::debug;

use crate::config::ChainRegistry;
use crate::error::{AirdropError, Result};
use crate::form::AirdropForm;
use crate::output::RowIssue;
use crate::parser::{parse_wei_token, split_list};
use crate::types::{AirdropCall, AirdropPlan, ApproveCall, Chain, PlanStep, Recipient};
use crate::validation::{validate_address, Address};

pub const PLAN_SCHEMA_VERSION: &str = "1.0";

/// A fully validated airdrop, ready to be planned or submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct AirdropRequest {
    pub chain_id: u64,
    pub tsender: Address,
    pub token: Address,
    pub recipients: Vec<Recipient>,
    /// Aggregated total of the amounts text.
    pub total: f64,
    /// Exact integer sum of the recipient amounts.
    pub total_wei: u128,
}

impl AirdropRequest {
    /// Validate the form inputs for `chain_id`.
    ///
    /// Every malformed entry is collected before failing so the caller can
    /// show all of them at once.
    pub fn from_form(
        form: &AirdropForm,
        chain_id: u64,
        registry: &ChainRegistry,
    ) -> Result<Self> {
        if form.token_address().trim().is_empty() {
            return Err(AirdropError::MissingInput("token address"));
        }
        if form.recipients().trim().is_empty() {
            return Err(AirdropError::MissingInput("recipients"));
        }
        if form.amounts().trim().is_empty() {
            return Err(AirdropError::MissingInput("amounts"));
        }

        let tsender = registry.tsender(chain_id)?;
        let mut issues = Vec::new();

        let token = match validate_address(form.token_address()) {
            Ok(addr) => Some(addr),
            Err(e) => {
                issues.push(RowIssue::new("token", None, e.to_string()));
                None
            }
        };

        let mut addresses = Vec::new();
        for (i, entry) in split_list(form.recipients()).into_iter().enumerate() {
            match validate_address(entry) {
                Ok(addr) => addresses.push(addr),
                Err(e) => issues.push(RowIssue::new("recipients", Some(i + 1), e.to_string())),
            }
        }

        let mut amounts = Vec::new();
        for (i, entry) in split_list(form.amounts()).into_iter().enumerate() {
            match parse_wei_token(entry) {
                Ok(amount) => amounts.push(amount),
                Err(e) => issues.push(RowIssue::new("amounts", Some(i + 1), e.to_string())),
            }
        }

        let recipient_count = split_list(form.recipients()).len();
        let amount_count = split_list(form.amounts()).len();
        if recipient_count != amount_count {
            issues.push(RowIssue::new(
                "amounts",
                None,
                format!("got {amount_count} amount(s) for {recipient_count} recipient(s)"),
            ));
        }

        let mut total_wei: u128 = 0;
        for amount in &amounts {
            match total_wei.checked_add(*amount) {
                Some(sum) => total_wei = sum,
                None => {
                    issues.push(RowIssue::new("amounts", None, "total amount overflow"));
                    break;
                }
            }
        }

        if issues.is_empty() && total_wei == 0 {
            issues.push(RowIssue::new("amounts", None, "total must be greater than 0"));
        }

        let token = match token {
            Some(token) if issues.is_empty() => token,
            _ => return Err(AirdropError::Validation(issues)),
        };

        let recipients = addresses
            .into_iter()
            .zip(amounts)
            .map(|(address, amount_wei)| Recipient {
                address,
                amount_wei,
            })
            .collect();

        Ok(Self {
            chain_id,
            tsender,
            token,
            recipients,
            total: form.total(),
            total_wei,
        })
    }

    pub fn approve_call(&self) -> ApproveCall {
        ApproveCall {
            token: self.token,
            spender: self.tsender,
            amount: self.total_wei,
        }
    }

    pub fn airdrop_call(&self) -> AirdropCall {
        AirdropCall {
            tsender: self.tsender,
            token: self.token,
            recipients: self.recipients.iter().map(|r| r.address).collect(),
            amounts: self.recipients.iter().map(|r| r.amount_wei).collect(),
            total: self.total_wei,
        }
    }

    /// Whether `allowance` is too small for this request.
    ///
    /// The exact wei sum is checked alongside the aggregated total so that
    /// float rounding on very large amounts never skips a needed approval.
    pub fn needs_approval(&self, allowance: u128) -> bool {
        needs_approval(self.total, allowance) || self.total_wei > allowance
    }
}

/// Approval gate: a new approval is needed when the total exceeds the
/// current allowance.
pub fn needs_approval(total: f64, allowance: u128) -> bool {
    total > allowance as f64
}

/// Lay out the transactions needed to airdrop `request` given the
/// allowance already granted to the TSender contract.
pub fn plan_airdrop(request: &AirdropRequest, allowance: u128) -> AirdropPlan {
    let approval_required = request.needs_approval(allowance);
    debug!(
        chain_id = request.chain_id,
        total_wei = %request.total_wei,
        allowance = %allowance,
        approval_required,
        "planning airdrop"
    );

    let mut steps = Vec::with_capacity(2);
    if approval_required {
        steps.push(PlanStep::Approve(request.approve_call()));
    }
    steps.push(PlanStep::Airdrop(request.airdrop_call()));

    AirdropPlan {
        schema_version: PLAN_SCHEMA_VERSION.to_string(),
        chain_id: request.chain_id,
        chain: Chain::from_chain_id(request.chain_id),
        recipient_count: request.recipients.len(),
        total: request.total,
        allowance,
        approval_required,
        steps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TSENDER: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";
    const TOKEN: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
    const ALICE: &str = "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359";
    const BOB: &str = "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB";

    fn registry() -> ChainRegistry {
        ChainRegistry::new().with_tsender(31_337, validate_address(TSENDER).unwrap())
    }

    fn request(recipients: &str, amounts: &str) -> Result<AirdropRequest> {
        let form = AirdropForm::with_inputs(TOKEN, recipients, amounts);
        AirdropRequest::from_form(&form, 31_337, &registry())
    }

    #[test]
    fn builds_request_from_valid_form() {
        let req = request(&format!("{ALICE},\n{BOB}"), "100, 200").unwrap();
        assert_eq!(req.recipients.len(), 2);
        assert_eq!(req.total, 300.0);
        assert_eq!(req.total_wei, 300);
        assert_eq!(req.tsender.to_checksum(), TSENDER);
        assert_eq!(req.recipients[1].address.to_checksum(), BOB);
        assert_eq!(req.recipients[1].amount_wei, 200);
    }

    #[test]
    fn missing_inputs_are_reported_first() {
        let form = AirdropForm::with_inputs(TOKEN, "", "1");
        let err = AirdropRequest::from_form(&form, 31_337, &registry()).unwrap_err();
        assert!(matches!(err, AirdropError::MissingInput("recipients")));
    }

    #[test]
    fn unknown_chain_is_rejected() {
        let form = AirdropForm::with_inputs(TOKEN, ALICE, "1");
        let err = AirdropRequest::from_form(&form, 324, &registry()).unwrap_err();
        assert!(matches!(err, AirdropError::Registry(_)));
    }

    #[test]
    fn collects_every_bad_entry() {
        let err = request(&format!("{ALICE}, 0x12314, {BOB}"), "1, abc, 2.5").unwrap_err();
        let issues = err.issues();
        assert_eq!(issues.len(), 3);
        assert_eq!(issues[0].field, "recipients");
        assert_eq!(issues[0].entry, Some(2));
        assert_eq!(issues[1].field, "amounts");
        assert_eq!(issues[1].entry, Some(2));
        assert_eq!(issues[2].entry, Some(3));
        assert!(issues[2].message.contains("whole number"));
    }

    #[test]
    fn count_mismatch_is_an_issue() {
        let err = request(&format!("{ALICE}, {BOB}"), "1").unwrap_err();
        assert_eq!(err.issues().len(), 1);
        assert!(err.issues()[0].message.contains("1 amount(s) for 2 recipient(s)"));
    }

    #[test]
    fn zero_total_is_rejected() {
        let err = request(ALICE, "0").unwrap_err();
        assert!(err.issues()[0].message.contains("greater than 0"));
    }

    #[test]
    fn bad_token_is_reported() {
        let form = AirdropForm::with_inputs("0xnot-a-token", ALICE, "1");
        let err = AirdropRequest::from_form(&form, 31_337, &registry()).unwrap_err();
        assert_eq!(err.issues()[0].field, "token");
        assert_eq!(err.issues()[0].entry, None);
    }

    #[test]
    fn overflowing_total_is_reported() {
        let max = u128::MAX.to_string();
        let err = request(&format!("{ALICE}, {BOB}"), &format!("{max}, 1")).unwrap_err();
        assert!(err.issues().iter().any(|i| i.message == "total amount overflow"));
    }

    #[test]
    fn approval_gate_compares_total_with_allowance() {
        assert!(needs_approval(300.0, 299));
        assert!(!needs_approval(300.0, 300));
        assert!(!needs_approval(300.0, 1_000));
        assert!(!needs_approval(0.0, 0));
    }

    #[test]
    fn plan_includes_approval_when_allowance_is_short() {
        let req = request(&format!("{ALICE}\n{BOB}"), "100\n200").unwrap();
        let plan = plan_airdrop(&req, 50);
        assert!(plan.approval_required);
        assert_eq!(plan.chain, Some(Chain::Anvil));
        assert_eq!(plan.steps.len(), 2);
        match &plan.steps[0] {
            PlanStep::Approve(call) => {
                assert_eq!(call.amount, 300);
                assert_eq!(call.spender, req.tsender);
            }
            other => panic!("expected approve step, got {other:?}"),
        }
        assert!(matches!(plan.steps[1], PlanStep::Airdrop(_)));
    }

    #[test]
    fn plan_skips_approval_when_allowance_covers_total() {
        let req = request(ALICE, "100").unwrap();
        let plan = plan_airdrop(&req, 100);
        assert!(!plan.approval_required);
        assert_eq!(plan.steps.len(), 1);
        match &plan.steps[0] {
            PlanStep::Airdrop(call) => {
                assert_eq!(call.recipients, vec![validate_address(ALICE).unwrap()]);
                assert_eq!(call.amounts, vec![100]);
                assert_eq!(call.total, 100);
            }
            other => panic!("expected airdrop step, got {other:?}"),
        }
    }

    #[test]
    fn exact_sum_guards_against_rounding() {
        // 2^53 + 1 rounds down to 2^53 as f64.
        let req = request(ALICE, "9007199254740993").unwrap();
        assert!(!needs_approval(req.total, 9_007_199_254_740_992));
        assert!(req.needs_approval(9_007_199_254_740_992));
    }

    #[test]
    fn plan_serializes_for_downstream_tooling() {
        let req = request(ALICE, "1000000000000000000").unwrap();
        let json = serde_json::to_value(plan_airdrop(&req, 0)).unwrap();
        assert_eq!(json["schema_version"], PLAN_SCHEMA_VERSION);
        assert_eq!(json["chain"], "anvil");
        assert_eq!(json["steps"][0]["kind"], "approve");
        assert_eq!(json["steps"][1]["kind"], "airdrop");
        assert_eq!(json["steps"][1]["amounts"][0], "1000000000000000000");
        assert_eq!(json["steps"][1]["recipients"][0], ALICE);
    }
}
