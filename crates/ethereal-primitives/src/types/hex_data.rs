//! Variable-length opaque byte sequence (calldata, revert payloads, ...).

use crate::error::Result;
use crate::hex;
use once_cell_like::OnceCell;
use std::fmt;

mod once_cell_like {
    //! A tiny single-assignment cell, used instead of pulling in `once_cell`
    //! for a single lazily-memoized field.
    use std::cell::UnsafeCell;
    use std::sync::Once;

    pub struct OnceCell<T> {
        once: Once,
        value: UnsafeCell<Option<T>>,
    }

    // SAFETY: `Once` guarantees the initializer runs exactly once and
    // happens-before any read of `value`; callers only ever observe `value`
    // through `get_or_init`.
    unsafe impl<T: Send + Sync> Sync for OnceCell<T> {}

    impl<T> OnceCell<T> {
        pub const fn new() -> Self {
            Self {
                once: Once::new(),
                value: UnsafeCell::new(None),
            }
        }

        pub fn get_or_init(&self, f: impl FnOnce() -> T) -> &T {
            self.once.call_once(|| {
                // SAFETY: only written once, under `Once`.
                unsafe { *self.value.get() = Some(f()) };
            });
            // SAFETY: initialized by the call above.
            unsafe { (*self.value.get()).as_ref().unwrap() }
        }
    }

    impl<T: Clone> Clone for OnceCell<T> {
        fn clone(&self) -> Self {
            let cell = Self::new();
            if let Some(v) = unsafe { (*self.value.get()).clone() } {
                cell.get_or_init(|| v);
            }
            cell
        }
    }
}

/// Variable-length opaque byte sequence with a lazily-memoized canonical
/// `0x`-prefixed lowercase hex representation.
///
/// Construction is idempotent, so computing the textual form at most once
/// (rather than eagerly) is a pure optimization; equality and ordering are
/// always over the byte view.
#[derive(Clone)]
pub struct HexData {
    bytes: Vec<u8>,
    text: OnceCell<String>,
}

impl HexData {
    /// The empty byte string.
    pub fn empty() -> Self {
        Self::from_bytes(Vec::new())
    }

    /// Wraps an owned byte buffer.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        HexData {
            bytes,
            text: OnceCell::new(),
        }
    }

    /// Parses a hex string (with or without `0x` prefix).
    pub fn from_hex(s: &str) -> Result<Self> {
        Ok(Self::from_bytes(hex::decode(s)?))
    }

    /// Borrowed byte view.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Canonical `0x`-prefixed lowercase hex text, computed at most once.
    pub fn to_hex(&self) -> &str {
        self.text
            .get_or_init(|| hex::encode_prefixed(&self.bytes))
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }
}

impl PartialEq for HexData {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}
impl Eq for HexData {}

impl fmt::Debug for HexData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HexData({})", self.to_hex())
    }
}

impl fmt::Display for HexData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_hex())
    }
}

impl From<Vec<u8>> for HexData {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<&[u8]> for HexData {
    fn from(bytes: &[u8]) -> Self {
        Self::from_bytes(bytes.to_vec())
    }
}

impl AsRef<[u8]> for HexData {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for HexData {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.to_hex())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for HexData {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        HexData::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memoizes_text_idempotently() {
        let data = HexData::from_bytes(vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(data.to_hex(), "0xdeadbeef");
        // second call must return the same memoized value
        assert_eq!(data.to_hex(), "0xdeadbeef");
    }

    #[test]
    fn round_trip_empty() {
        let data = HexData::empty();
        assert_eq!(data.to_hex(), "0x");
        assert!(HexData::from_hex("0x").unwrap().is_empty());
    }
}
