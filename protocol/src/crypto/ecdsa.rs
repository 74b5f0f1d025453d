//! # secp256k1 ECDSA Recovery
//!
//! Plain key-holders authorize by signing the EIP-712 digest; the wrapper
//! recovers the signing address and compares it to the claimed owner.
//!
//! ## Malleability
//!
//! For every valid `(r, s)` there is a twin `(r, n - s)` that recovers the
//! same key. We accept only the low half (`s <= n/2`) and only the two
//! canonical recovery ids, so each authorization has exactly one valid
//! encoding. These checks run *before* recovery and in that order, `s`
//! first, then `v`, since the order decides which error a caller sees.
//!
//! A signature that is well-formed but unrecoverable (zero `r`, `r` past
//! the curve order, no point on the curve) recovers to the zero address,
//! the same thing `ecrecover` does. The caller turns that into
//! `BadSignatory`.

use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, SigningKey, VerifyingKey};
use primitive_types::H256;
use thiserror::Error;

use super::hash::keccak256;
use super::verifier::SignatureError;
use crate::config::{ACCEPTED_RECOVERY_IDS, RECOVERY_ID_OFFSET, SECP256K1_HALF_ORDER};
use crate::types::{Address, Digest, Signature};

/// Errors from key construction.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid secret key bytes: zero or not below the curve order")]
    InvalidSecretKey,

    #[error("signing failed")]
    SigningFailed,
}

/// Recover the address that produced `signature` over `digest`.
///
/// # Errors
///
/// - [`SignatureError::InvalidSignatureS`] if `s` is in the upper half of
///   the curve order.
/// - [`SignatureError::InvalidSignatureV`] if `v` is not 27 or 28.
///
/// Any other defect yields `Ok(Address::zero())`.
pub fn recover_signer(digest: &Digest, signature: &Signature) -> Result<Address, SignatureError> {
    if signature.s > SECP256K1_HALF_ORDER {
        return Err(SignatureError::InvalidSignatureS);
    }
    if !ACCEPTED_RECOVERY_IDS.contains(&signature.v) {
        return Err(SignatureError::InvalidSignatureV { v: signature.v });
    }

    let mut compact = [0u8; 64];
    compact[..32].copy_from_slice(signature.r.as_bytes());
    compact[32..].copy_from_slice(signature.s.as_bytes());

    let Ok(parsed) = EcdsaSignature::from_slice(&compact) else {
        return Ok(Address::zero());
    };
    let Some(recovery_id) = RecoveryId::from_byte(signature.v - RECOVERY_ID_OFFSET) else {
        return Ok(Address::zero());
    };

    match VerifyingKey::recover_from_prehash(digest.as_bytes(), &parsed, recovery_id) {
        Ok(key) => Ok(address_of(&key)),
        Err(_) => Ok(Address::zero()),
    }
}

/// Derive the Ethereum address of a public key: the low 20 bytes of the
/// Keccak-256 of the uncompressed point (without the `0x04` tag).
pub fn address_of(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    Address::from_slice(&hash.as_bytes()[12..])
}

/// A secp256k1 signing key with its derived address.
///
/// Used by the scenario runner to act on behalf of named actors and by the
/// test suites to mint real signatures. No `Debug`: secret keys stay out
/// of logs.
#[derive(Clone)]
pub struct EcdsaKeypair {
    signing_key: SigningKey,
    address: Address,
}

impl EcdsaKeypair {
    /// Construct from 32 bytes of secret key material.
    pub fn from_seed(seed: &[u8; 32]) -> Result<Self, KeyError> {
        let signing_key = SigningKey::from_slice(seed).map_err(|_| KeyError::InvalidSecretKey)?;
        let address = address_of(signing_key.verifying_key());
        Ok(Self {
            signing_key,
            address,
        })
    }

    /// Deterministic keypair for a symbolic name (`"alice"`, `"bob"`).
    ///
    /// The seed is `keccak256(name)`, re-hashed in the astronomically
    /// unlikely case it falls outside the valid scalar range. Development
    /// and testing only: anyone who knows the name knows the key.
    pub fn from_name(name: &str) -> Self {
        let mut seed = keccak256(name.as_bytes());
        loop {
            if let Ok(keypair) = Self::from_seed(&seed.0) {
                return keypair;
            }
            seed = keccak256(seed.as_bytes());
        }
    }

    /// The address this key signs for.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Sign a 32-byte digest, producing a low-s signature with `v ∈ {27, 28}`.
    pub fn sign_digest(&self, digest: &Digest) -> Result<Signature, KeyError> {
        let (mut sig, mut recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(digest.as_bytes())
            .map_err(|_| KeyError::SigningFailed)?;

        if let Some(normalized) = sig.normalize_s() {
            sig = normalized;
            recovery_id = RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced());
        }

        let bytes = sig.to_bytes();
        Ok(Signature {
            v: recovery_id.to_byte() + RECOVERY_ID_OFFSET,
            r: H256::from_slice(&bytes[..32]),
            s: H256::from_slice(&bytes[32..]),
        })
    }
}
