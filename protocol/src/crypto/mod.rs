//! # Cryptographic Primitives
//!
//! Everything between "here are some bytes and a signature" and "this
//! address authorized it". The wrapper is EVM-shaped, so the choices are
//! made for us:
//!
//! - **Keccak-256** for every hash, including address derivation.
//! - **EIP-712** typed-data digests with a per-deployment domain separator.
//! - **secp256k1 ECDSA** recovery for plain key-holders, with low-s and
//!   `v ∈ {27, 28}` enforced to shut the malleability door.
//! - **EIP-1271** callbacks for smart-contract signers.
//!
//! As always: thin, typed wrappers around audited implementations (`k256`,
//! `sha3`). No hand-rolled curve arithmetic.

pub mod ecdsa;
pub mod eip712;
pub mod hash;
pub mod verifier;

pub use ecdsa::{address_of, recover_signer, EcdsaKeypair, KeyError};
pub use eip712::{encumber_struct_hash, permit_struct_hash, typed_digest, DomainSeparator};
pub use hash::keccak256;
pub use verifier::{
    ContractSigner, DelegatingWallet, SignatureError, SignatureVerifier, SignerCallError,
    SignerRegistry,
};
