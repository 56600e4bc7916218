use crate::error::VaultError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A 20-byte account address.
///
/// Parsing is strict: `0x` prefix plus exactly 40 hex characters. Anything
/// else (including the 41-character strings that sneak into guardian lists)
/// is rejected up front, before any encoding happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Truncated display form used by the status line: first 6 chars of the
    /// `0x…` string, `...`, last 4 chars.
    pub fn short(&self) -> String {
        let full = self.to_string();
        format!("{}...{}", &full[..6], &full[full.len() - 4..])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex_part = s
            .strip_prefix("0x")
            .ok_or_else(|| VaultError::InvalidGuardian(format!("missing 0x prefix: {}", s)))?;
        if hex_part.len() != 40 {
            return Err(VaultError::InvalidGuardian(format!(
                "expected 40 hex chars, got {}: {}",
                hex_part.len(),
                s
            )));
        }
        let bytes = hex::decode(hex_part)
            .map_err(|_| VaultError::InvalidGuardian(format!("non-hex characters: {}", s)))?;
        let mut out = [0u8; 20];
        out.copy_from_slice(&bytes);
        Ok(Address(out))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
