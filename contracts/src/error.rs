//! Error taxonomy for the wrapper contract.
//!
//! Every failure aborts the whole operation; nothing is retried or
//! swallowed. The variants split into three families:
//!
//! - user errors (not enough available balance, allowance, or a bad
//!   authorization): the caller asked for something the ledger cannot do;
//! - collaborator errors (the underlying asset refused or answered in a
//!   shape we do not understand);
//! - [`TokenError::InvariantViolated`]: the ledger caught itself in an
//!   inconsistent state. This should be unreachable and is never the
//!   caller's fault.

use etw_protocol::crypto::SignatureError;
use etw_protocol::{Address, Amount};
use thiserror::Error;

/// Errors raised by the wrapper and its engines.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// A transfer, encumbrance or unwrap exceeds what is not already encumbered.
    #[error("insufficient available balance: {account:?} has {available} available, requested {requested}")]
    InsufficientAvailableBalance {
        account: Address,
        available: Amount,
        requested: Amount,
    },

    /// The part of a pull transfer not covered by the taker's encumbrance
    /// exceeds the source's available balance.
    #[error("insufficient balance: {account:?} has {available} available for the excess, requested {requested}")]
    InsufficientBalance {
        account: Address,
        available: Amount,
        requested: Amount,
    },

    /// An attempt to spend more encumbrance than exists.
    #[error("insufficient encumbrance: {owner:?} -> {taker:?} is {encumbered}, requested {requested}")]
    InsufficientEncumbrance {
        owner: Address,
        taker: Address,
        encumbered: Amount,
        requested: Amount,
    },

    /// The standard allowance does not cover a delegated operation.
    #[error("insufficient allowance: {owner:?} -> {spender:?} is {allowance}, requested {requested}")]
    InsufficientAllowance {
        owner: Address,
        spender: Address,
        allowance: Amount,
        requested: Amount,
    },

    /// The authorization's signature was rejected.
    #[error(transparent)]
    Signature(#[from] SignatureError),

    /// The authorization was submitted at or after its expiry.
    #[error("signature expired: expiry {expiry}, now {now}")]
    SignatureExpired { expiry: Amount, now: u64 },

    /// The underlying asset's debit or credit failed, or answered with an
    /// unrecognized result shape.
    #[error("underlying transfer failed: {reason}")]
    UnderlyingTransferFailed { reason: String },

    /// Tokens cannot be sent to the zero address.
    #[error("invalid receiver: {0:?}")]
    InvalidReceiver(Address),

    /// The custody account cannot deposit into itself.
    #[error("invalid depositor: {0:?}")]
    InvalidDepositor(Address),

    /// An addition would exceed 2^256 - 1.
    #[error("arithmetic overflow in {context}")]
    Overflow { context: &'static str },

    /// Internal consistency failure. The ledger should never get here.
    #[error("ledger invariant violated: {0}")]
    InvariantViolated(String),
}

impl TokenError {
    pub(crate) fn underlying(reason: impl Into<String>) -> Self {
        TokenError::UnderlyingTransferFailed {
            reason: reason.into(),
        }
    }

    /// `true` for the internal-consistency family.
    pub fn is_fatal(&self) -> bool {
        matches!(self, TokenError::InvariantViolated(_))
    }

    /// Stable snake_case name of the failure kind, for reports and
    /// scenario expectations.
    pub fn kind(&self) -> &'static str {
        match self {
            TokenError::InsufficientAvailableBalance { .. } => "insufficient_available_balance",
            TokenError::InsufficientBalance { .. } => "insufficient_balance",
            TokenError::InsufficientEncumbrance { .. } => "insufficient_encumbrance",
            TokenError::InsufficientAllowance { .. } => "insufficient_allowance",
            TokenError::Signature(SignatureError::InvalidSignatureS) => "invalid_signature_s",
            TokenError::Signature(SignatureError::InvalidSignatureV { .. }) => "invalid_signature_v",
            TokenError::Signature(SignatureError::BadSignatory) => "bad_signatory",
            TokenError::Signature(SignatureError::SignatureCallFailed(_)) => {
                "signature_call_failed"
            }
            TokenError::SignatureExpired { .. } => "signature_expired",
            TokenError::UnderlyingTransferFailed { .. } => "underlying_transfer_failed",
            TokenError::InvalidReceiver(_) => "invalid_receiver",
            TokenError::InvalidDepositor(_) => "invalid_depositor",
            TokenError::Overflow { .. } => "overflow",
            TokenError::InvariantViolated(_) => "invariant_violated",
        }
    }
}

/// Result alias used across the crate.
pub type TokenResult<T> = Result<T, TokenError>;
