//! # Primitive Types
//!
//! The wrapper speaks the EVM's vocabulary: 160-bit addresses, 256-bit
//! unsigned amounts, 32-byte digests and `(v, r, s)` signatures. We take the
//! fixed-width types from `primitive-types` instead of inventing our own;
//! they come with checked arithmetic and serde support out of the box.
//!
//! Amounts never wrap. Every addition and subtraction in the engine goes
//! through `checked_add` / `checked_sub`; a `U256` that silently wraps is a
//! money printer.

use primitive_types::{H160, H256, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A 20-byte account or contract address. The zero address is the null
/// signer and the mint/burn counterparty in event logs.
pub type Address = H160;

/// A token quantity in the smallest unit. 256-bit, unsigned, non-wrapping.
pub type Amount = U256;

/// A 32-byte Keccak-256 digest.
pub type Digest = H256;

/// Length of the `r ‖ s ‖ v` signature encoding handed to contract signers.
pub const SIGNATURE_BYTES_LENGTH: usize = 65;

/// An ECDSA signature in Ethereum's split form.
///
/// `v` is the recovery identifier in its legacy `27 | 28` encoding; `r` and
/// `s` are the raw big-endian scalars. No validation happens at construction:
/// a signature is just three numbers until the verifier looks at it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// Recovery identifier (27 or 28 for a well-formed signature).
    pub v: u8,
    /// The `r` scalar.
    pub r: H256,
    /// The `s` scalar.
    pub s: H256,
}

impl Signature {
    /// Build a signature from its components.
    pub fn new(v: u8, r: H256, s: H256) -> Self {
        Self { v, r, s }
    }

    /// The packed `r ‖ s ‖ v` encoding, 65 bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(SIGNATURE_BYTES_LENGTH);
        out.extend_from_slice(self.r.as_bytes());
        out.extend_from_slice(self.s.as_bytes());
        out.push(self.v);
        out
    }

    /// Parse the packed `r ‖ s ‖ v` encoding. Returns `None` unless the
    /// input is exactly 65 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != SIGNATURE_BYTES_LENGTH {
            return None;
        }
        Some(Self {
            r: H256::from_slice(&bytes[..32]),
            s: H256::from_slice(&bytes[32..64]),
            v: bytes[64],
        })
    }
}

/// Errors from [`parse_amount`] and [`parse_address`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountParseError {
    #[error("empty amount")]
    Empty,

    #[error("invalid amount literal: {0}")]
    Invalid(String),

    #[error("amount does not fit in 256 bits: {0}")]
    Overflow(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

/// Parse a human-written amount.
///
/// Three notations are accepted:
///
/// - decimal: `"1500"`
/// - hex: `"0x5dc"`
/// - unit-scaled: `"100e18"` (mantissa times ten to the exponent)
///
/// ```
/// use etw_protocol::types::{parse_amount, Amount};
///
/// assert_eq!(parse_amount("40e18").unwrap(), Amount::from(40u64) * Amount::exp10(18));
/// assert_eq!(parse_amount("0x10").unwrap(), Amount::from(16u64));
/// ```
pub fn parse_amount(literal: &str) -> Result<Amount, AmountParseError> {
    let literal = literal.trim().replace('_', "");
    if literal.is_empty() {
        return Err(AmountParseError::Empty);
    }

    if let Some(hex_digits) = literal
        .strip_prefix("0x")
        .or_else(|| literal.strip_prefix("0X"))
    {
        if hex_digits.is_empty() || hex_digits.len() > 64 {
            return Err(AmountParseError::Invalid(literal.clone()));
        }
        return U256::from_str_radix(hex_digits, 16)
            .map_err(|_| AmountParseError::Invalid(literal.clone()));
    }

    let (mantissa, exponent) = match literal.split_once(['e', 'E']) {
        Some((m, e)) => {
            let exp: u32 = e
                .parse()
                .map_err(|_| AmountParseError::Invalid(literal.clone()))?;
            (m, exp)
        }
        None => (literal.as_str(), 0),
    };

    if mantissa.is_empty() || !mantissa.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AmountParseError::Invalid(literal.clone()));
    }

    let base =
        U256::from_dec_str(mantissa).map_err(|_| AmountParseError::Overflow(literal.clone()))?;
    if base.is_zero() {
        return Ok(base);
    }
    let scale = U256::from(10u8)
        .checked_pow(U256::from(exponent))
        .ok_or_else(|| AmountParseError::Overflow(literal.clone()))?;

    base.checked_mul(scale)
        .ok_or(AmountParseError::Overflow(literal))
}

/// Parse a `0x`-prefixed (or bare) 40-digit hex address.
pub fn parse_address(literal: &str) -> Result<Address, AmountParseError> {
    let trimmed = literal.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let bytes =
        hex::decode(digits).map_err(|_| AmountParseError::InvalidAddress(literal.to_string()))?;
    if bytes.len() != 20 {
        return Err(AmountParseError::InvalidAddress(literal.to_string()));
    }
    Ok(Address::from_slice(&bytes))
}
