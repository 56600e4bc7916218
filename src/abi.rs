//! Contract-ABI call encoding.
//!
//! Only the shapes the vault component actually sends are implemented:
//! 32-byte words for `address`/`uint256`, dynamic `address[]` and `bytes`,
//! and 4-byte selectors. The layouts must match the standard ABI exactly,
//! since the payloads execute on-chain as-is.

use crate::address::Address;
use crate::crypto::keccak256;

pub const WORD: usize = 32;

/// First 4 bytes of keccak256 of the canonical signature, e.g.
/// `"enableModule(address)"`.
pub fn selector(signature: &str) -> [u8; 4] {
    let digest = keccak256(signature.as_bytes());
    [digest[0], digest[1], digest[2], digest[3]]
}

/// Left-pad an address into a 32-byte word.
pub fn word_address(addr: &Address) -> [u8; WORD] {
    let mut out = [0u8; WORD];
    out[12..].copy_from_slice(addr.as_bytes());
    out
}

/// Big-endian uint256 word from a u128.
pub fn word_uint(value: u128) -> [u8; WORD] {
    let mut out = [0u8; WORD];
    out[16..].copy_from_slice(&value.to_be_bytes());
    out
}

/// Dynamic `bytes`: offset word, length word, payload padded to a word
/// boundary.
fn encode_bytes(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(2 * WORD + data.len() + WORD);
    out.extend_from_slice(&word_uint(WORD as u128)); // offset of the data
    out.extend_from_slice(&word_uint(data.len() as u128));
    out.extend_from_slice(data);
    let pad = (WORD - data.len() % WORD) % WORD;
    out.extend(std::iter::repeat(0u8).take(pad));
    out
}

/// `enableModule(address)` against the smart account itself.
pub fn enable_module(module: &Address) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + WORD);
    out.extend_from_slice(&selector("enableModule(address)"));
    out.extend_from_slice(&word_address(module));
    out
}

/// `setup(bytes)` against the recovery module, where the inner bytes are
/// the ABI tuple `(address[] guardians, uint256 threshold, uint256 delay)`.
pub fn recovery_setup(guardians: &[Address], threshold: u64, delay_secs: u64) -> Vec<u8> {
    let inner = encode_guardian_tuple(guardians, threshold, delay_secs);
    let mut out = Vec::with_capacity(4 + inner.len() + 2 * WORD);
    out.extend_from_slice(&selector("setup(bytes)"));
    out.extend_from_slice(&encode_bytes(&inner));
    out
}

/// `(address[], uint256, uint256)`: three head slots (array offset,
/// threshold, delay) followed by the array tail (length, then elements).
fn encode_guardian_tuple(guardians: &[Address], threshold: u64, delay_secs: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity((3 + 1 + guardians.len()) * WORD);
    out.extend_from_slice(&word_uint((3 * WORD) as u128)); // array starts after the head
    out.extend_from_slice(&word_uint(threshold as u128));
    out.extend_from_slice(&word_uint(delay_secs as u128));
    out.extend_from_slice(&word_uint(guardians.len() as u128));
    for guardian in guardians {
        out.extend_from_slice(&word_address(guardian));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u8) -> Address {
        let mut bytes = [0u8; 20];
        bytes[19] = n;
        Address(bytes)
    }

    #[test]
    fn known_selectors() {
        assert_eq!(hex::encode(selector("transfer(address,uint256)")), "a9059cbb");
        assert_eq!(hex::encode(selector("enableModule(address)")), "610b5925");
    }

    #[test]
    fn enable_module_is_selector_plus_padded_address() {
        let data = enable_module(&addr(0xaa));
        assert_eq!(data.len(), 4 + WORD);
        assert_eq!(&data[..4], &selector("enableModule(address)"));
        assert_eq!(&data[4..16], &[0u8; 12]); // left padding
        assert_eq!(data[35], 0xaa);
    }

    #[test]
    fn guardian_tuple_layout() {
        let guardians: Vec<Address> = (1..=5).map(addr).collect();
        let inner = encode_guardian_tuple(&guardians, 3, 172_800);
        // 3 head words + length word + 5 elements
        assert_eq!(inner.len(), 9 * WORD);
        assert_eq!(&inner[..WORD], &word_uint(0x60));
        assert_eq!(&inner[WORD..2 * WORD], &word_uint(3));
        assert_eq!(&inner[2 * WORD..3 * WORD], &word_uint(172_800));
        assert_eq!(&inner[3 * WORD..4 * WORD], &word_uint(5));
        // guardian order is preserved verbatim
        for (i, guardian) in guardians.iter().enumerate() {
            let start = (4 + i) * WORD;
            assert_eq!(&inner[start..start + WORD], &word_address(guardian));
        }
    }

    #[test]
    fn setup_wraps_tuple_as_bytes() {
        let guardians: Vec<Address> = (1..=5).map(addr).collect();
        let data = recovery_setup(&guardians, 3, 172_800);
        assert_eq!(&data[..4], &selector("setup(bytes)"));
        // offset word then length word
        assert_eq!(&data[4..4 + WORD], &word_uint(WORD as u128));
        assert_eq!(&data[4 + WORD..4 + 2 * WORD], &word_uint((9 * WORD) as u128));
        // 9-word payload is already word-aligned, no padding
        assert_eq!(data.len(), 4 + 2 * WORD + 9 * WORD);
    }

    #[test]
    fn threshold_and_delay_fixed_regardless_of_order() {
        let forward: Vec<Address> = (1..=5).map(addr).collect();
        let mut reversed = forward.clone();
        reversed.reverse();
        let a = recovery_setup(&forward, 3, 172_800);
        let b = recovery_setup(&reversed, 3, 172_800);
        // same threshold/delay words in both encodings
        assert_eq!(&a[4 + 2 * WORD + WORD..4 + 2 * WORD + 3 * WORD],
                   &b[4 + 2 * WORD + WORD..4 + 2 * WORD + 3 * WORD]);
    }

    #[test]
    fn bytes_padding_rounds_up_to_word() {
        let padded = encode_bytes(&[1, 2, 3]);
        assert_eq!(padded.len(), 3 * WORD);
        assert_eq!(&padded[WORD..2 * WORD], &word_uint(3));
        assert_eq!(&padded[2 * WORD..2 * WORD + 3], &[1, 2, 3]);
        assert!(padded[2 * WORD + 3..].iter().all(|b| *b == 0));
    }
}
