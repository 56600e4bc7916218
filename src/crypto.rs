use crate::address::Address;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use sha3::{Digest, Keccak256};

/// keccak256 over `data`.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// An owner signing key for a vault. Generated fresh per creation attempt
/// and held only in memory; there is no persistence path on purpose.
pub struct OwnerKey {
    signing_key: SigningKey,
}

impl OwnerKey {
    /// Generate a new random owner key.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        OwnerKey { signing_key }
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Owner address: last 20 bytes of keccak256(public key).
    pub fn address(&self) -> Address {
        let digest = keccak256(self.verifying_key().as_bytes());
        let mut out = [0u8; 20];
        out.copy_from_slice(&digest[12..]);
        Address(out)
    }

    /// Sign an operation digest.
    pub fn sign(&self, message: &[u8]) -> Signature {
        self.signing_key.sign(message)
    }

    /// Sign and return hex (convenience for wire payloads).
    pub fn sign_hex(&self, message: &[u8]) -> String {
        hex::encode(self.sign(message).to_bytes())
    }

    /// Verify a signature against this key's public half.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        self.verifying_key().verify(message, signature).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keccak_matches_known_vector() {
        // canonical keccak256 digest of empty input
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn sign_verify_round_trip() {
        let key = OwnerKey::generate();
        let sig = key.sign(b"user operation digest");
        assert!(key.verify(b"user operation digest", &sig));
        assert!(!key.verify(b"something else", &sig));
    }

    #[test]
    fn fresh_keys_have_distinct_addresses() {
        let a = OwnerKey::generate();
        let b = OwnerKey::generate();
        assert_ne!(a.address(), b.address());
        // derived address is stable for the same key
        assert_eq!(a.address(), a.address());
    }
}
