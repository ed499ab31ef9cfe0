//! Amount list aggregation.
//!
//! [`compute_total`] is the all-or-nothing total shown next to the amounts
//! input and compared against the token allowance. It returns `0.0` both for
//! an empty list and for a list containing any malformed entry; callers that
//! need to tell those apart use [`try_compute_total`].

use thiserror::Error;

use crate::parser::{parse_amount_token, split_list, AmountParseError};

/// Sum of a fully valid amount list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmountTotal {
    pub total: f64,
    /// Number of non-empty entries; zero means nothing was entered.
    pub count: usize,
}

impl AmountTotal {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmountListError {
    #[error("entry {index} ('{token}') is not a valid amount: {source}")]
    InvalidToken {
        /// Zero-based position among the non-empty entries.
        index: usize,
        token: String,
        #[source]
        source: AmountParseError,
    },
}

/// Sum an amounts list, reporting the first malformed entry.
pub fn try_compute_total(text: &str) -> Result<AmountTotal, AmountListError> {
    let tokens = split_list(text);

    let mut total = 0.0_f64;
    for (index, token) in tokens.iter().enumerate() {
        let value = parse_amount_token(token).map_err(|source| AmountListError::InvalidToken {
            index,
            token: (*token).to_string(),
            source,
        })?;
        total += value;
    }

    Ok(AmountTotal {
        total,
        count: tokens.len(),
    })
}

/// Sum an amounts list, or `0.0` if any entry is malformed.
pub fn compute_total(text: &str) -> f64 {
    try_compute_total(text).map(|t| t.total).unwrap_or(0.0)
}
