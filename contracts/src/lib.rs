// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Encumbered Token Wrapper
//!
//! Wraps an existing fungible token and adds *encumbrances*: a holder can
//! commit part of their balance to a specific counterparty without giving
//! up custody. The committed part stays in the holder's balance but can
//! only be moved by that counterparty.
//!
//! - **Ledger** — balances, the encumbrance sub-ledger, allowances, nonces.
//! - **Transfer engine** — free transfers of the unencumbered balance, and
//!   pull transfers that spend the taker's encumbrance before its allowance.
//! - **Encumbrance engine** — create, delegate and release encumbrances.
//! - **Authorization engine** — EIP-712 signed `permit` and `encumber`
//!   grants, verified by ECDSA or EIP-1271 depending on the signer.
//! - **Underlying** — the wrapped asset and the interpretation of its
//!   transfer results.
//!
//! ## Design Principles
//!
//! 1. All arithmetic is checked. Wrapping arithmetic and money do not mix.
//! 2. Every precondition is validated before the first write, so a failed
//!    call never leaves partial state behind.
//! 3. A broken internal invariant is reported as
//!    [`TokenError::InvariantViolated`], never as a user error.
//! 4. Every public state type is serializable (serde) for snapshots and
//!    reports.

pub mod authorization;
pub mod clock;
pub mod encumbrance;
pub mod error;
pub mod events;
pub mod ledger;
pub mod token;
pub mod transfer;
pub mod underlying;

pub use authorization::{Authorization, AuthorizationContext};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{TokenError, TokenResult};
pub use events::{Event, EventLog};
pub use ledger::{EncumbranceDelta, Ledger};
pub use token::{EncumberedToken, WrapReceipt};
pub use transfer::PullBreakdown;
pub use underlying::{CallOutcome, InMemoryAsset, ReturnStyle, UnderlyingAsset};
