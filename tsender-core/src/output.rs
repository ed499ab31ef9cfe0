//! Output helpers for human and agent modes.

use serde::Serialize;

/// Wei per whole token for 18-decimal ERC-20 tokens.
pub const WEI_PER_TOKEN: f64 = 1e18;

/// Human (TTY) vs Agent (non-interactive) output selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Agent,
}

/// Structured error collected for one entry of a form input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowIssue {
    /// Form input the entry came from: `token`, `recipients`, or `amounts`.
    pub field: String,
    /// One-based entry position within the input list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<usize>,
    pub message: String,
}

impl RowIssue {
    pub fn new(field: &str, entry: Option<usize>, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            entry,
            message: message.into(),
        }
    }
}

/// Agent-mode error payload.
#[derive(Debug, Clone, Serialize)]
pub struct AgentError {
    pub error: String,
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<RowIssue>>,
}

/// The two renderings of an aggregated total shown beside the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TotalDisplay {
    pub wei: String,
    pub tokens: String,
}

impl TotalDisplay {
    pub fn new(total: f64) -> Self {
        Self {
            wei: format_total_wei(total),
            tokens: format_total_tokens(total),
        }
    }
}

/// Render a total as raw integer units, dropping any fractional part.
pub fn format_total_wei(total: f64) -> String {
    if !total.is_finite() {
        return "overflow".to_string();
    }
    let whole = total.trunc();
    if whole == 0.0 {
        return "0".to_string();
    }
    format!("{whole:.0}")
}

/// Render a total in whole tokens with six decimals, or `"0"` for zero.
pub fn format_total_tokens(total: f64) -> String {
    if !total.is_finite() {
        return "overflow".to_string();
    }
    if total == 0.0 {
        return "0".to_string();
    }
    format!("{:.6}", total / WEI_PER_TOKEN)
}

/// Truncate long addresses for human-readable tables.
pub fn truncate_address(addr: &str) -> String {
    let s = addr.trim();
    if s.chars().count() <= 14 {
        return s.to_string();
    }

    let start: String = s.chars().take(6).collect();
    let end: String = s
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    format!("{start}...{end}")
}
