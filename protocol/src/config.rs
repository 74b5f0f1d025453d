//! # Protocol Configuration & Constants
//!
//! Every magic number in the wrapper lives here. The EIP-712 type strings
//! in particular are consensus-critical: change one character and every
//! signature produced by every wallet stops verifying.

use primitive_types::H256;
use serde::{Deserialize, Serialize};

use crate::types::Address;

// ---------------------------------------------------------------------------
// Domain
// ---------------------------------------------------------------------------

/// Fixed version string mixed into the EIP-712 domain separator.
pub const DOMAIN_VERSION: &str = "1";

/// Prefix prepended to the underlying asset's name to form the wrapper name.
pub const WRAPPED_NAME_PREFIX: &str = "Encumbered ";

/// Prefix prepended to the underlying asset's symbol.
pub const WRAPPED_SYMBOL_PREFIX: &str = "e";

/// EIP-712 domain type.
pub const EIP712_DOMAIN_TYPE: &str =
    "EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)";

/// Typed structure signed for a gasless allowance grant.
pub const PERMIT_TYPE: &str =
    "Permit(address owner,address spender,uint256 amount,uint256 nonce,uint256 expiry)";

/// Typed structure signed for a gasless encumbrance grant.
pub const ENCUMBER_TYPE: &str =
    "Encumber(address owner,address taker,uint256 amount,uint256 nonce,uint256 expiry)";

/// The two-byte prefix of an EIP-712 digest preimage.
pub const EIP712_PREFIX: [u8; 2] = [0x19, 0x01];

// ---------------------------------------------------------------------------
// Signatures
// ---------------------------------------------------------------------------

/// `bytes4(keccak256("isValidSignature(bytes32,bytes)"))`, the value a
/// contract signer returns to accept a signature (EIP-1271).
pub const EIP1271_MAGIC_VALUE: [u8; 4] = [0x16, 0x26, 0xba, 0x7e];

/// Half the order of the secp256k1 group. Signatures with `s` above this
/// are the malleated twin of a low-s signature and are rejected.
pub const SECP256K1_HALF_ORDER: H256 = H256([
    0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0x5d, 0x57, 0x6e, 0x73, 0x57, 0xa4, 0x50, 0x1d, 0xdf, 0xe9, 0x2f, 0x46, 0x68, 0x1b, 0x20, 0xa0,
]);

/// Accepted values of `v`. Anything else is rejected before recovery.
pub const ACCEPTED_RECOVERY_IDS: [u8; 2] = [27, 28];

/// Offset between the legacy `v` encoding and the raw recovery id.
pub const RECOVERY_ID_OFFSET: u8 = 27;

// ---------------------------------------------------------------------------
// Deployments
// ---------------------------------------------------------------------------

/// Local development chain (anvil / hardhat default).
pub const CHAIN_ID_DEVNET: u64 = 31_337;

/// Address the devnet deployment pretends to live at.
pub const DEVNET_CONTRACT_ADDRESS: [u8; 20] = [
    0x5f, 0xbd, 0xb2, 0x31, 0x56, 0x78, 0xaf, 0xec, 0xb3, 0x67, 0xf0, 0x32, 0xd9, 0x3f, 0x64, 0x2f,
    0x64, 0x18, 0x0a, 0xa3,
];

/// Identity of one wrapper deployment: which chain, which address.
///
/// Together with the wrapper's name these feed the domain separator, which
/// is computed once at construction and never changes afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentConfig {
    /// Chain identifier bound into every signed authorization.
    pub chain_id: u64,
    /// The wrapper's own address. Also the custody account on the
    /// underlying asset.
    pub address: Address,
}

impl DeploymentConfig {
    pub fn new(chain_id: u64, address: Address) -> Self {
        Self { chain_id, address }
    }

    /// Defaults for local development.
    pub fn devnet() -> Self {
        Self {
            chain_id: CHAIN_ID_DEVNET,
            address: Address::from(DEVNET_CONTRACT_ADDRESS),
        }
    }
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self::devnet()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hash::keccak256;

    #[test]
    fn magic_value_matches_selector() {
        let selector = keccak256(b"isValidSignature(bytes32,bytes)");
        assert_eq!(&selector.as_bytes()[..4], &EIP1271_MAGIC_VALUE);
    }

    #[test]
    fn devnet_defaults() {
        let cfg = DeploymentConfig::default();
        assert_eq!(cfg.chain_id, CHAIN_ID_DEVNET);
        assert_ne!(cfg.address, Address::zero());
    }
}
