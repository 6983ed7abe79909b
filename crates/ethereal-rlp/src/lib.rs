//! # RLP codec
//!
//! Recursive-length-prefix encoding, the only serialization used for legacy
//! transaction envelopes and for the keccak preimages of typed envelopes'
//! payload bodies.
//!
//! An [`Item`] is either a byte-string or a list of items. [`encode`]
//! produces the canonical encoding; [`decode`] rejects non-canonical input
//! (leading zeros in length headers, single bytes encoded with a
//! string-prefix, trailing garbage when using [`decode_exact`]).

mod item;

pub use item::Item;

use ethereal_primitives::Error;

/// Result alias for this crate, reusing the toolkit's sealed [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Encodes an RLP item into its canonical byte representation.
pub fn encode(item: &Item) -> Vec<u8> {
    let mut out = Vec::new();
    item.encode_into(&mut out);
    out
}

/// Decodes a single RLP item from the front of `input`, returning the item
/// and the unconsumed remainder.
pub fn decode(input: &[u8]) -> Result<(Item, &[u8])> {
    Item::decode_from(input)
}

/// Decodes a single RLP item, requiring that `input` be fully consumed.
pub fn decode_exact(input: &[u8]) -> Result<Item> {
    let (item, rest) = decode(input)?;
    if !rest.is_empty() {
        return Err(Error::Rlp(format!(
            "trailing garbage after RLP item: {} bytes",
            rest.len()
        )));
    }
    Ok(item)
}

/// Convenience trait for types that can be encoded as a single RLP item.
pub trait Encodable {
    fn to_rlp_item(&self) -> Item;
}

/// Convenience trait for types that can be decoded from a single RLP item.
pub trait Decodable: Sized {
    fn from_rlp_item(item: &Item) -> Result<Self>;
}

impl Encodable for u64 {
    fn to_rlp_item(&self) -> Item {
        Item::String(encode_uint_minimal(*self as u128))
    }
}

impl Encodable for u128 {
    fn to_rlp_item(&self) -> Item {
        Item::String(encode_uint_minimal(*self))
    }
}

impl Decodable for u64 {
    fn from_rlp_item(item: &Item) -> Result<Self> {
        let bytes = item.as_string()?;
        decode_uint_minimal(bytes).and_then(|v| {
            u64::try_from(v).map_err(|_| Error::Rlp("uint64 overflow".to_string()))
        })
    }
}

impl Decodable for u128 {
    fn from_rlp_item(item: &Item) -> Result<Self> {
        decode_uint_minimal(item.as_string()?)
    }
}

impl Encodable for [u8] {
    fn to_rlp_item(&self) -> Item {
        Item::String(self.to_vec())
    }
}

impl Encodable for Vec<u8> {
    fn to_rlp_item(&self) -> Item {
        Item::String(self.clone())
    }
}

impl<T: Encodable> Encodable for Option<T> {
    fn to_rlp_item(&self) -> Item {
        match self {
            Some(v) => v.to_rlp_item(),
            None => Item::String(Vec::new()),
        }
    }
}

impl<T: Encodable> Encodable for Vec<T> {
    fn to_rlp_item(&self) -> Item {
        Item::List(self.iter().map(Encodable::to_rlp_item).collect())
    }
}

/// Encodes an unsigned integer as its minimal big-endian byte string (no
/// leading zero bytes; the empty string represents zero).
fn encode_uint_minimal(value: u128) -> Vec<u8> {
    if value == 0 {
        return Vec::new();
    }
    let bytes = value.to_be_bytes();
    let first_nonzero = bytes.iter().position(|&b| b != 0).unwrap();
    bytes[first_nonzero..].to_vec()
}

/// Decodes a minimal big-endian byte string into an unsigned integer,
/// rejecting encodings with a leading zero byte (non-canonical).
fn decode_uint_minimal(bytes: &[u8]) -> Result<u128> {
    if bytes.len() > 16 {
        return Err(Error::Rlp("uint128 overflow".to_string()));
    }
    if !bytes.is_empty() && bytes[0] == 0 {
        return Err(Error::Rlp("non-canonical uint encoding: leading zero byte".to_string()));
    }
    let mut buf = [0u8; 16];
    buf[16 - bytes.len()..].copy_from_slice(bytes);
    Ok(u128::from_be_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_and_list() {
        assert_eq!(encode(&Item::String(Vec::new())), vec![0x80]);
        assert_eq!(encode(&Item::List(Vec::new())), vec![0xc0]);
    }

    #[test]
    fn single_byte_below_0x80_is_itself() {
        assert_eq!(encode(&Item::String(vec![0x00])), vec![0x00]);
        assert_eq!(encode(&Item::String(vec![0x7f])), vec![0x7f]);
    }

    #[test]
    fn single_byte_at_or_above_0x80_gets_prefixed() {
        assert_eq!(encode(&Item::String(vec![0x80])), vec![0x81, 0x80]);
    }

    #[test]
    fn short_string() {
        let item = Item::String(b"dog".to_vec());
        assert_eq!(encode(&item), vec![0x83, b'd', b'o', b'g']);
    }

    #[test]
    fn long_string_over_55_bytes() {
        let data = vec![b'a'; 56];
        let encoded = encode(&Item::String(data.clone()));
        assert_eq!(encoded[0], 0xb8);
        assert_eq!(encoded[1], 56);
        assert_eq!(&encoded[2..], &data[..]);
    }

    #[test]
    fn round_trip_nested_list() {
        let item = Item::List(vec![
            Item::String(b"cat".to_vec()),
            Item::List(vec![Item::String(vec![0x01]), Item::String(vec![])]),
        ]);
        let encoded = encode(&item);
        let decoded = decode_exact(&encoded).unwrap();
        assert_eq!(item, decoded);
    }

    #[test]
    fn rejects_leading_zero_length_header() {
        // a long-form string header whose length bytes carry a leading
        // zero is non-canonical.
        let malformed = vec![0xb8, 0x00, 0x61];
        assert!(decode_exact(&malformed).is_err());
    }

    #[test]
    fn rejects_non_canonical_single_byte_string() {
        // 0x00 must be encoded as itself, not as 0x8100.
        let malformed = vec![0x81, 0x00];
        assert!(decode_exact(&malformed).is_err());
    }

    #[test]
    fn rejects_trailing_garbage() {
        let mut encoded = encode(&Item::String(b"dog".to_vec()));
        encoded.push(0xff);
        assert!(decode_exact(&encoded).is_err());
    }

    #[test]
    fn uint_round_trip() {
        for v in [0u64, 1, 127, 128, 255, 256, u64::MAX] {
            let item = v.to_rlp_item();
            let decoded = u64::from_rlp_item(&item).unwrap();
            assert_eq!(decoded, v);
        }
    }
}
