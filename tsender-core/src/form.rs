//! Airdrop form state with synchronous total recomputation.

use crate::aggregator::compute_total;
use crate::output::TotalDisplay;

/// The three user inputs plus the state derived from them.
///
/// Every setter invalidates the approval confirmation; `set_amounts` also
/// recomputes the cached total before returning.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AirdropForm {
    token_address: String,
    recipients: String,
    amounts: String,
    total: f64,
    approval_confirmed: bool,
}

impl AirdropForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_inputs(token_address: &str, recipients: &str, amounts: &str) -> Self {
        let mut form = Self::new();
        form.set_token_address(token_address);
        form.set_recipients(recipients);
        form.set_amounts(amounts);
        form
    }

    pub fn set_token_address(&mut self, value: &str) {
        self.token_address = value.to_string();
        self.approval_confirmed = false;
    }

    pub fn set_recipients(&mut self, value: &str) {
        self.recipients = value.to_string();
        self.approval_confirmed = false;
    }

    pub fn set_amounts(&mut self, value: &str) {
        self.amounts = value.to_string();
        self.total = compute_total(&self.amounts);
        self.approval_confirmed = false;
    }

    pub fn token_address(&self) -> &str {
        &self.token_address
    }

    pub fn recipients(&self) -> &str {
        &self.recipients
    }

    pub fn amounts(&self) -> &str {
        &self.amounts
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn display_total(&self) -> TotalDisplay {
        TotalDisplay::new(self.total)
    }

    /// Record that the approval transaction for the current inputs was mined.
    pub fn confirm_approval(&mut self) {
        self.approval_confirmed = true;
    }

    pub fn approval_confirmed(&self) -> bool {
        self.approval_confirmed
    }

    /// Submission is allowed once all three inputs are non-empty.
    pub fn can_submit(&self) -> bool {
        !self.token_address.is_empty() && !self.recipients.is_empty() && !self.amounts.is_empty()
    }
}
