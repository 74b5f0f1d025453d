// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Encumbered Token Wrapper: Protocol Primitives
//!
//! The building blocks shared by the wrapper contract and its tooling:
//! fixed-width amounts and addresses, the deployment constants, and the
//! signature machinery behind gasless approvals and encumbrances.
//!
//! ## Modules
//!
//! - **types** — `Address`, `Amount`, `Digest`, `Signature`, amount parsing.
//! - **config** — Domain version, EIP-712 type strings, curve constants,
//!   deployment parameters.
//! - **crypto** — Keccak-256 and ABI word encoding, EIP-712 digests, ECDSA
//!   recovery with the malleability guard, and the polymorphic
//!   [`SignatureVerifier`](crypto::SignatureVerifier) that handles both
//!   plain keys and contract signers.
//!
//! Nothing here touches balances. The accounting engine lives in
//! `etw-contracts`; this crate only answers "who signed this digest?".

pub mod config;
pub mod crypto;
pub mod types;

pub use types::{parse_address, parse_amount, Address, Amount, AmountParseError, Digest, Signature};
