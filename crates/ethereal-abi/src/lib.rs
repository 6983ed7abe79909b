//! # ABI codec
//!
//! The contract ABI's type schema, a two-pass head/tail encoder/decoder,
//! function selector computation, and best-effort revert decoding.

mod codec;
mod revert;
mod schema;
mod selector;
mod value;

pub use codec::{decode_list, encode_list};
pub use revert::{decode_revert, encode_error, encode_panic};
pub use schema::Schema;
pub use selector::{canonical_signature, selector, Selector};
pub use value::Value;

use ethereal_primitives::Result;

/// Encodes a function call's calldata: `selector(name, schemas) || encode_list(values, schemas)`.
pub fn encode_call(name: &str, schemas: &[Schema], values: &[Value]) -> Result<Vec<u8>> {
    let mut out = selector(name, schemas).to_vec();
    out.extend(encode_list(values, schemas)?);
    Ok(out)
}

/// Decodes the return data of a successful call against the declared output
/// schemas (no selector prefix on return data).
pub fn decode_returns(data: &[u8], schemas: &[Schema]) -> Result<Vec<Value>> {
    decode_list(data, schemas)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_call_prefixes_selector() {
        let calldata = encode_call(
            "transfer",
            &[Schema::Address, Schema::uint256()],
            &[
                Value::Address(ethereal_primitives::Address::ZERO),
                Value::uint(1_000u64),
            ],
        )
        .unwrap();
        assert_eq!(&calldata[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(calldata.len(), 4 + 64);
    }
}
