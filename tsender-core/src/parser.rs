//! Delimited list splitting and strict amount-literal parsing.

use thiserror::Error;

/// Characters that separate entries in a recipients or amounts list.
pub const LIST_DELIMITERS: [char; 2] = [',', '\n'];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmountParseError {
    #[error("amount is empty")]
    Empty,
    #[error("amount has a '+' sign; only a leading '-' is allowed")]
    PlusSign,
    #[error("amount contains invalid characters")]
    InvalidCharacters,
    #[error("amount has more than one decimal point")]
    MultipleDecimalPoints,
    #[error("amount needs digits on both sides of the decimal point")]
    MissingDigits,
    #[error("amount must not be negative")]
    Negative,
    #[error("amount must be a whole number of wei")]
    Fractional,
    #[error("amount does not fit in 128 bits")]
    Overflow,
}

/// Split a user-entered list on runs of commas and newlines.
///
/// Entries are trimmed and empty entries are dropped, so `"1,,2,\n,3"`
/// yields `["1", "2", "3"]` and `",,\n,"` yields nothing.
pub fn split_list(text: &str) -> Vec<&str> {
    text.split(LIST_DELIMITERS)
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .collect()
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Check `token` against `-?digits(.digits)?` and report the first violation.
fn check_literal(token: &str) -> Result<(), AmountParseError> {
    if token.is_empty() {
        return Err(AmountParseError::Empty);
    }
    if token.starts_with('+') {
        return Err(AmountParseError::PlusSign);
    }

    let unsigned = token.strip_prefix('-').unwrap_or(token);
    if !unsigned.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
        return Err(AmountParseError::InvalidCharacters);
    }
    if unsigned.bytes().filter(|b| *b == b'.').count() > 1 {
        return Err(AmountParseError::MultipleDecimalPoints);
    }

    match unsigned.split_once('.') {
        None if all_digits(unsigned) => Ok(()),
        Some((whole, frac)) if all_digits(whole) && all_digits(frac) => Ok(()),
        _ => Err(AmountParseError::MissingDigits),
    }
}

/// Parse a single trimmed amount token as a decimal literal.
///
/// Accepts an optional leading `-`, one or more digits, and an optional
/// fractional part with at least one digit. Exponents, `+`, thousands
/// separators, and bare points (`".5"`, `"5."`) are rejected.
pub fn parse_amount_token(token: &str) -> Result<f64, AmountParseError> {
    check_literal(token)?;
    token
        .parse::<f64>()
        .map_err(|_| AmountParseError::InvalidCharacters)
}

/// Parse a single trimmed amount token as an integer wei amount for the
/// on-chain call.
pub fn parse_wei_token(token: &str) -> Result<u128, AmountParseError> {
    check_literal(token)?;
    if token.starts_with('-') {
        return Err(AmountParseError::Negative);
    }
    if token.contains('.') {
        return Err(AmountParseError::Fractional);
    }
    token.parse::<u128>().map_err(|_| AmountParseError::Overflow)
}
