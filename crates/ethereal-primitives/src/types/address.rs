//! 20-byte Ethereum address.

use crate::error::{Error, Result};
use crate::hex;
use std::fmt;
use std::str::FromStr;

/// A 20-byte Ethereum address.
///
/// Canonical textual form is lowercased `0x` + 40 hex chars; equality and
/// hashing are over the raw bytes, so two addresses built from differently
/// cased hex strings are always equal.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address([u8; 20]);

impl Address {
    /// The zero address.
    pub const ZERO: Address = Address([0u8; 20]);

    /// Builds an address from a raw 20-byte buffer.
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Address(bytes)
    }

    /// Builds an address from a byte slice, rejecting anything other than
    /// 20 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 20 {
            return Err(Error::Malformed(format!(
                "address must be 20 bytes, got {}",
                bytes.len()
            )));
        }
        let mut buf = [0u8; 20];
        buf.copy_from_slice(bytes);
        Ok(Address(buf))
    }

    /// Parses a hex string (with or without `0x` prefix) into an address.
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s)?;
        Self::from_slice(&bytes)
    }

    /// The last 20 bytes of `keccak(uncompressed_pubkey)`, per standard EVM
    /// address derivation.
    pub fn from_pubkey_hash(keccak_of_pubkey: &[u8; 32]) -> Self {
        let mut buf = [0u8; 20];
        buf.copy_from_slice(&keccak_of_pubkey[12..32]);
        Address(buf)
    }

    /// Returns the raw 20 bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Canonical `0x`-prefixed, lowercased textual form.
    pub fn to_hex(&self) -> String {
        hex::encode_prefixed(&self.0)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Address(bytes)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Address::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_insensitive_equality() {
        let a = Address::from_hex("0x0000000000000000000000000000000000000001").unwrap();
        let b = Address::from_hex("0000000000000000000000000000000000000001").unwrap();
        let c = Address::from_hex("0X0000000000000000000000000000000000000001").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(a.to_hex(), "0x0000000000000000000000000000000000000001");
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(Address::from_hex("0x00").is_err());
        assert!(Address::from_hex("0x00000000000000000000000000000000000000ff").is_err());
    }
}
