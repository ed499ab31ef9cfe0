//! EVM address validation with EIP-55 checksum support.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};
use thiserror::Error;

/// Number of hex characters in an address body.
pub const ADDRESS_HEX_LEN: usize = 40;

/// A 20-byte EVM account or contract address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; 20]);

impl Address {
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// EIP-55 mixed-case representation.
    pub fn to_checksum(&self) -> String {
        to_checksum(self)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = AddressValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate_address(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_checksum())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        validate_address(&s).map_err(serde::de::Error::custom)
    }
}

/// Validation errors for recipient and contract addresses.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressValidationError {
    #[error("address is empty")]
    Empty,
    #[error("address must start with '0x'")]
    MissingPrefix,
    #[error("address must have {ADDRESS_HEX_LEN} hex characters after '0x' (got {actual})")]
    InvalidLength { actual: usize },
    #[error("address contains invalid characters (hex digits only)")]
    InvalidCharacters,
    #[error("zero address is not allowed")]
    ZeroAddress,
    #[error("address has mixed case but fails the EIP-55 checksum")]
    BadChecksum,
}

fn keccak_hex(input: &str) -> [u8; 32] {
    Keccak256::digest(input.as_bytes()).into()
}

/// Render `address` in EIP-55 checksum form.
pub fn to_checksum(address: &Address) -> String {
    let lower = hex::encode(address.0);
    let hash = keccak_hex(&lower);

    let mut out = String::with_capacity(2 + ADDRESS_HEX_LEN);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let byte = hash[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Validate a `0x`-prefixed address.
///
/// Single-case input is accepted as-is. Mixed-case input is treated as an
/// EIP-55 checksum and must match.
pub fn validate_address(addr: &str) -> Result<Address, AddressValidationError> {
    let s = addr.trim();
    if s.is_empty() {
        return Err(AddressValidationError::Empty);
    }

    let body = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .ok_or(AddressValidationError::MissingPrefix)?;

    if !body.is_ascii() {
        return Err(AddressValidationError::InvalidCharacters);
    }
    if body.len() != ADDRESS_HEX_LEN {
        return Err(AddressValidationError::InvalidLength { actual: body.len() });
    }

    let mut bytes = [0u8; 20];
    hex::decode_to_slice(body, &mut bytes)
        .map_err(|_| AddressValidationError::InvalidCharacters)?;
    if bytes == [0u8; 20] {
        return Err(AddressValidationError::ZeroAddress);
    }

    let address = Address(bytes);
    let has_lower = body.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = body.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper && &to_checksum(&address)[2..] != body {
        return Err(AddressValidationError::BadChecksum);
    }

    Ok(address)
}
