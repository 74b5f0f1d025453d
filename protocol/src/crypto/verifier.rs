//! # Signer Verification
//!
//! An authorization names an owner and carries a signature. Who the owner
//! *is* decides how the signature is checked:
//!
//! - a plain key-holder is checked by ECDSA recovery
//!   ([`recover_signer`](super::ecdsa::recover_signer));
//! - a smart contract is asked directly through its EIP-1271
//!   `isValidSignature(digest, signature)` callback.
//!
//! [`SignatureVerifier`] is the single entry point. It probes the
//! [`SignerRegistry`] ("does this address expose a validation capability?")
//! and dispatches to the matching variant.
//!
//! A contract callback can fail in two different ways and the distinction
//! is preserved: the call itself errored ([`SignatureError::SignatureCallFailed`])
//! versus the call answered with something other than the magic value
//! ([`SignatureError::BadSignatory`]).

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;
use tracing::debug;

use super::ecdsa::recover_signer;
use crate::config::EIP1271_MAGIC_VALUE;
use crate::types::{Address, Digest, Signature};

/// Why a signature was not accepted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignatureError {
    /// `s` lies above half the curve order.
    #[error("invalid signature 's' value")]
    InvalidSignatureS,

    /// `v` is not one of the accepted recovery ids.
    #[error("invalid signature 'v' value: {v}")]
    InvalidSignatureV { v: u8 },

    /// The recovered or validated signer is not the claimed owner, or
    /// recovery produced the zero address.
    #[error("bad signatory")]
    BadSignatory,

    /// A contract signer's validation callback errored.
    #[error("signature validation call failed: {0}")]
    SignatureCallFailed(String),
}

/// Failure raised by a contract signer's validation callback itself.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct SignerCallError {
    pub reason: String,
}

impl SignerCallError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// A smart-contract signer (EIP-1271).
///
/// Implementations return [`EIP1271_MAGIC_VALUE`] to accept a signature.
/// Any other value rejects it; an `Err` means the call itself failed.
pub trait ContractSigner {
    fn is_valid_signature(
        &self,
        digest: &Digest,
        signature: &[u8],
    ) -> Result<[u8; 4], SignerCallError>;
}

/// Addresses that carry executable signer logic.
///
/// An address absent from the registry is a plain key-holder.
#[derive(Default)]
pub struct SignerRegistry {
    signers: BTreeMap<Address, Box<dyn ContractSigner>>,
}

impl SignerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach signer logic to `address`, replacing whatever was there.
    pub fn register(&mut self, address: Address, signer: Box<dyn ContractSigner>) {
        self.signers.insert(address, signer);
    }

    /// Detach signer logic; the address reverts to being a plain key-holder.
    pub fn unregister(&mut self, address: &Address) -> bool {
        self.signers.remove(address).is_some()
    }

    /// The capability probe.
    pub fn is_contract(&self, address: &Address) -> bool {
        self.signers.contains_key(address)
    }

    pub fn get(&self, address: &Address) -> Option<&dyn ContractSigner> {
        self.signers.get(address).map(|s| s.as_ref())
    }

    pub fn len(&self) -> usize {
        self.signers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signers.is_empty()
    }
}

impl fmt::Debug for SignerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.signers.keys()).finish()
    }
}

/// Verification strategy for one claimed signer.
pub enum SignatureVerifier<'a> {
    /// Plain key-holder: ECDSA recovery.
    Ecdsa,
    /// Smart contract: EIP-1271 callback.
    ContractCallback(&'a dyn ContractSigner),
}

impl<'a> SignatureVerifier<'a> {
    /// Pick the strategy for `owner` by probing the registry.
    pub fn for_signer(registry: &'a SignerRegistry, owner: &Address) -> Self {
        match registry.get(owner) {
            Some(signer) => SignatureVerifier::ContractCallback(signer),
            None => SignatureVerifier::Ecdsa,
        }
    }

    /// Check that `signature` over `digest` was produced by `owner`.
    pub fn verify(
        &self,
        owner: &Address,
        digest: &Digest,
        signature: &Signature,
    ) -> Result<(), SignatureError> {
        match self {
            SignatureVerifier::Ecdsa => {
                let recovered = recover_signer(digest, signature)?;
                if recovered.is_zero() || recovered != *owner {
                    debug!(?owner, ?recovered, "ecdsa signer mismatch");
                    return Err(SignatureError::BadSignatory);
                }
                Ok(())
            }
            SignatureVerifier::ContractCallback(signer) => {
                let answer = signer
                    .is_valid_signature(digest, &signature.to_bytes())
                    .map_err(|e| SignatureError::SignatureCallFailed(e.reason))?;
                if answer != EIP1271_MAGIC_VALUE {
                    debug!(?owner, answer = %hex::encode(answer), "contract signer refused");
                    return Err(SignatureError::BadSignatory);
                }
                Ok(())
            }
        }
    }
}

/// A minimal smart wallet: accepts any signature its controlling key made.
///
/// This is the common shape of EIP-1271 wallets in the wild (a contract
/// account with a single owner key) and is what the scenario runner
/// deploys for `contract_signers`.
#[derive(Clone, Debug)]
pub struct DelegatingWallet {
    controller: Address,
}

impl DelegatingWallet {
    pub fn new(controller: Address) -> Self {
        Self { controller }
    }

    pub fn controller(&self) -> Address {
        self.controller
    }
}

impl ContractSigner for DelegatingWallet {
    fn is_valid_signature(
        &self,
        digest: &Digest,
        signature: &[u8],
    ) -> Result<[u8; 4], SignerCallError> {
        let parsed = Signature::from_bytes(signature)
            .ok_or_else(|| SignerCallError::new("signature must be 65 bytes"))?;
        match recover_signer(digest, &parsed) {
            Ok(signer) if !signer.is_zero() && signer == self.controller => Ok(EIP1271_MAGIC_VALUE),
            _ => Ok([0u8; 4]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::ecdsa::EcdsaKeypair;
    use crate::crypto::hash::keccak256;

    struct Reverting;

    impl ContractSigner for Reverting {
        fn is_valid_signature(&self, _: &Digest, _: &[u8]) -> Result<[u8; 4], SignerCallError> {
            Err(SignerCallError::new("execution reverted"))
        }
    }

    struct Refusing;

    impl ContractSigner for Refusing {
        fn is_valid_signature(&self, _: &Digest, _: &[u8]) -> Result<[u8; 4], SignerCallError> {
            Ok([0xde, 0xad, 0xbe, 0xef])
        }
    }

    #[test]
    fn unregistered_owner_uses_ecdsa() {
        let registry = SignerRegistry::new();
        let kp = EcdsaKeypair::from_name("alice");
        let digest = keccak256(b"payload");
        let sig = kp.sign_digest(&digest).unwrap();

        let verifier = SignatureVerifier::for_signer(&registry, &kp.address());
        assert!(matches!(verifier, SignatureVerifier::Ecdsa));
        assert!(verifier.verify(&kp.address(), &digest, &sig).is_ok());

        let other = EcdsaKeypair::from_name("mallory").address();
        assert_eq!(
            verifier.verify(&other, &digest, &sig),
            Err(SignatureError::BadSignatory)
        );
    }

    #[test]
    fn zero_owner_never_verifies() {
        let registry = SignerRegistry::new();
        let sig = Signature::new(27, Default::default(), Digest::from_low_u64_be(1));
        let verifier = SignatureVerifier::for_signer(&registry, &Address::zero());
        assert_eq!(
            verifier.verify(&Address::zero(), &keccak256(b"x"), &sig),
            Err(SignatureError::BadSignatory)
        );
    }

    #[test]
    fn registered_wallet_uses_callback() {
        let controller = EcdsaKeypair::from_name("controller");
        let wallet_addr = Address::repeat_byte(0x77);
        let mut registry = SignerRegistry::new();
        registry.register(wallet_addr, Box::new(DelegatingWallet::new(controller.address())));
        assert!(registry.is_contract(&wallet_addr));

        let digest = keccak256(b"wallet payload");
        let sig = controller.sign_digest(&digest).unwrap();
        let verifier = SignatureVerifier::for_signer(&registry, &wallet_addr);
        assert!(matches!(verifier, SignatureVerifier::ContractCallback(_)));
        assert!(verifier.verify(&wallet_addr, &digest, &sig).is_ok());

        let stranger = EcdsaKeypair::from_name("stranger").sign_digest(&digest).unwrap();
        assert_eq!(
            verifier.verify(&wallet_addr, &digest, &stranger),
            Err(SignatureError::BadSignatory)
        );
    }

    #[test]
    fn callback_failure_is_distinct_from_refusal() {
        let mut registry = SignerRegistry::new();
        let reverting = Address::repeat_byte(1);
        let refusing = Address::repeat_byte(2);
        registry.register(reverting, Box::new(Reverting));
        registry.register(refusing, Box::new(Refusing));

        let digest = keccak256(b"anything");
        let sig = Signature::new(27, Digest::repeat_byte(1), Digest::repeat_byte(1));

        assert!(matches!(
            SignatureVerifier::for_signer(&registry, &reverting).verify(&reverting, &digest, &sig),
            Err(SignatureError::SignatureCallFailed(_))
        ));
        assert_eq!(
            SignatureVerifier::for_signer(&registry, &refusing).verify(&refusing, &digest, &sig),
            Err(SignatureError::BadSignatory)
        );
    }

    #[test]
    fn contract_path_skips_malleability_checks() {
        // The contract decides what it accepts; the s/v guards belong to
        // the ECDSA path only.
        struct AcceptAll;
        impl ContractSigner for AcceptAll {
            fn is_valid_signature(&self, _: &Digest, _: &[u8]) -> Result<[u8; 4], SignerCallError> {
                Ok(EIP1271_MAGIC_VALUE)
            }
        }

        let mut registry = SignerRegistry::new();
        let addr = Address::repeat_byte(3);
        registry.register(addr, Box::new(AcceptAll));
        let sig = Signature::new(0, Digest::repeat_byte(0xff), Digest::repeat_byte(0xff));
        assert!(SignatureVerifier::for_signer(&registry, &addr)
            .verify(&addr, &keccak256(b"z"), &sig)
            .is_ok());
    }

    #[test]
    fn unregister_restores_ecdsa() {
        let mut registry = SignerRegistry::new();
        let addr = Address::repeat_byte(4);
        registry.register(addr, Box::new(Refusing));
        assert!(registry.unregister(&addr));
        assert!(!registry.is_contract(&addr));
        assert!(registry.is_empty());
    }
}
