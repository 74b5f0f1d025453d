//! # Hashing & ABI Words
//!
//! Keccak-256 (the pre-standard SHA-3 variant Ethereum uses, not FIPS
//! SHA3-256; the padding differs) plus the handful of ABI encoders the
//! EIP-712 struct hashes need. Every field is a 32-byte big-endian word.

use primitive_types::U256;
use sha3::{Digest as _, Keccak256};

use crate::types::{Address, Digest};

/// Compute the Keccak-256 digest of `data`.
///
/// ```
/// use etw_protocol::crypto::keccak256;
///
/// let empty = keccak256(b"");
/// assert_eq!(
///     hex::encode(empty.as_bytes()),
///     "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
/// );
/// ```
pub fn keccak256(data: &[u8]) -> Digest {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    Digest::from_slice(&hasher.finalize())
}

/// Hash several byte slices as if they were concatenated.
pub fn keccak256_multi(parts: &[&[u8]]) -> Digest {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    Digest::from_slice(&hasher.finalize())
}

/// ABI-encode an address: left-padded to 32 bytes.
pub fn encode_address(address: &Address) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address.as_bytes());
    word
}

/// ABI-encode a `uint256`.
pub fn encode_u256(value: &U256) -> [u8; 32] {
    let mut word = [0u8; 32];
    value.to_big_endian(&mut word);
    word
}

/// ABI-encode a `u64` as a `uint256`.
pub fn encode_u64(value: u64) -> [u8; 32] {
    encode_u256(&U256::from(value))
}

/// ABI-encode a `bool`.
pub fn encode_bool(value: bool) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[31] = u8::from(value);
    word
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keccak_known_vector() {
        // keccak256("abc")
        assert_eq!(
            hex::encode(keccak256(b"abc").as_bytes()),
            "4e03657aea45a94fc7d47ba826c8d667c0d1e6e33a64a036ec44f58fa12d6c45"
        );
    }

    #[test]
    fn multi_part_matches_concatenation() {
        let joined = keccak256(b"hello world");
        let parts = keccak256_multi(&[b"hello", b" ", b"world"]);
        assert_eq!(joined, parts);
    }

    #[test]
    fn address_is_left_padded() {
        let addr = Address::repeat_byte(0xaa);
        let word = encode_address(&addr);
        assert_eq!(&word[..12], &[0u8; 12]);
        assert_eq!(&word[12..], &[0xaa; 20]);
    }

    #[test]
    fn integers_are_big_endian() {
        let word = encode_u64(0x0102);
        assert_eq!(word[30], 0x01);
        assert_eq!(word[31], 0x02);
        assert_eq!(encode_u256(&U256::MAX), [0xff; 32]);
    }

    #[test]
    fn bools_are_single_low_byte() {
        assert_eq!(encode_bool(true)[31], 1);
        assert_eq!(encode_bool(false), [0u8; 32]);
    }
}
