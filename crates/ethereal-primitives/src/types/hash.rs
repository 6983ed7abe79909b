//! 32-byte hash/identifier (block hash, tx hash, storage key, ...).

use crate::error::{Error, Result};
use crate::hex;
use std::fmt;
use std::str::FromStr;

/// A 32-byte identifier: block hash, transaction hash, storage slot key, or
/// an EIP-4844 blob versioned hash.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct B256([u8; 32]);

impl B256 {
    /// The all-zero hash.
    pub const ZERO: B256 = B256([0u8; 32]);

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        B256(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 32 {
            return Err(Error::Malformed(format!(
                "hash must be 32 bytes, got {}",
                bytes.len()
            )));
        }
        let mut buf = [0u8; 32];
        buf.copy_from_slice(bytes);
        Ok(B256(buf))
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s)?;
        Self::from_slice(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode_prefixed(&self.0)
    }

    /// Returns true if this hash's leading byte is the EIP-4844 blob
    /// versioned-hash version marker (`0x01`).
    pub fn is_blob_versioned(&self) -> bool {
        self.0[0] == 0x01
    }
}

impl fmt::Debug for B256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "B256({})", self.to_hex())
    }
}

impl fmt::Display for B256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for B256 {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl From<[u8; 32]> for B256 {
    fn from(bytes: [u8; 32]) -> Self {
        B256(bytes)
    }
}

impl AsRef<[u8]> for B256 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for B256 {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for B256 {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        B256::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let h = B256::from_bytes([0xab; 32]);
        assert_eq!(B256::from_hex(&h.to_hex()).unwrap(), h);
    }

    #[test]
    fn blob_version_check() {
        let mut bytes = [0u8; 32];
        bytes[0] = 0x01;
        assert!(B256::from_bytes(bytes).is_blob_versioned());
        assert!(!B256::ZERO.is_blob_versioned());
    }
}
