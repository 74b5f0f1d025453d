//! # EIP-712 Typed Data
//!
//! Off-chain authorizations are signed over
//!
//! ```text
//! digest = keccak256(0x19 0x01 ‖ domainSeparator ‖ structHash)
//! ```
//!
//! The domain separator binds the wrapper's name, the fixed version
//! string, the chain id and the wrapper's own address, so a signature for
//! one deployment is worthless on any other. It is computed once when the
//! wrapper is constructed and never recomputed.
//!
//! The struct hash binds the payload, including the owner's nonce *as
//! stored by the contract*. Callers never supply the nonce; that is what
//! makes a consumed authorization unreplayable.

use primitive_types::U256;
use serde::{Deserialize, Serialize};

use super::hash::{encode_address, encode_u256, encode_u64, keccak256, keccak256_multi};
use crate::config::{DeploymentConfig, EIP712_DOMAIN_TYPE, EIP712_PREFIX, ENCUMBER_TYPE, PERMIT_TYPE};
use crate::types::{Address, Digest};

/// A computed EIP-712 domain separator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainSeparator(Digest);

impl DomainSeparator {
    /// Compute the separator for `(name, version, chain_id, verifying_contract)`.
    pub fn new(name: &str, version: &str, chain_id: u64, verifying_contract: Address) -> Self {
        let type_hash = keccak256(EIP712_DOMAIN_TYPE.as_bytes());
        let name_hash = keccak256(name.as_bytes());
        let version_hash = keccak256(version.as_bytes());

        Self(keccak256_multi(&[
            type_hash.as_bytes(),
            name_hash.as_bytes(),
            version_hash.as_bytes(),
            &encode_u64(chain_id),
            &encode_address(&verifying_contract),
        ]))
    }

    /// Convenience constructor from a deployment description.
    pub fn for_deployment(name: &str, version: &str, deployment: &DeploymentConfig) -> Self {
        Self::new(name, version, deployment.chain_id, deployment.address)
    }

    /// The raw 32-byte separator.
    pub fn digest(&self) -> Digest {
        self.0
    }
}

/// Hash of a `Permit(owner, spender, amount, nonce, expiry)` structure.
pub fn permit_struct_hash(
    owner: &Address,
    spender: &Address,
    amount: &U256,
    nonce: &U256,
    expiry: &U256,
) -> Digest {
    authorization_struct_hash(PERMIT_TYPE, owner, spender, amount, nonce, expiry)
}

/// Hash of an `Encumber(owner, taker, amount, nonce, expiry)` structure.
pub fn encumber_struct_hash(
    owner: &Address,
    taker: &Address,
    amount: &U256,
    nonce: &U256,
    expiry: &U256,
) -> Digest {
    authorization_struct_hash(ENCUMBER_TYPE, owner, taker, amount, nonce, expiry)
}

// Both authorization kinds share one field layout; only the type string differs.
fn authorization_struct_hash(
    type_string: &str,
    owner: &Address,
    counterparty: &Address,
    amount: &U256,
    nonce: &U256,
    expiry: &U256,
) -> Digest {
    let type_hash = keccak256(type_string.as_bytes());
    keccak256_multi(&[
        type_hash.as_bytes(),
        &encode_address(owner),
        &encode_address(counterparty),
        &encode_u256(amount),
        &encode_u256(nonce),
        &encode_u256(expiry),
    ])
}

/// The final digest a signer signs: `keccak256(0x1901 ‖ domain ‖ struct)`.
pub fn typed_digest(domain: &DomainSeparator, struct_hash: &Digest) -> Digest {
    keccak256_multi(&[&EIP712_PREFIX, domain.0.as_bytes(), struct_hash.as_bytes()])
}
