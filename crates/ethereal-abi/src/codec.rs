//! The two-pass "head/tail" encoder and decoder.
//!
//! A static type occupies its full static width directly in the head; a
//! dynamic type occupies a single 32-byte offset word in the head, with its
//! payload appended to the tail. The same head/tail pass is applied
//! recursively for nested dynamic arrays and tuples, with offsets always
//! relative to the start of the enclosing head/tail block.

use ethereal_primitives::{Address, Error, Int256, Result, Wei};

use crate::schema::Schema;
use crate::value::Value;

const WORD: usize = 32;

/// Encodes a list of values against their schemas into a single head/tail
/// block (used both for a whole calldata argument list and for nested
/// tuples/arrays).
pub fn encode_list(values: &[Value], schemas: &[Schema]) -> Result<Vec<u8>> {
    if values.len() != schemas.len() {
        return Err(Error::AbiEncoding(format!(
            "argument count mismatch: {} values, {} schemas",
            values.len(),
            schemas.len()
        )));
    }

    let mut heads: Vec<Vec<u8>> = Vec::with_capacity(values.len());
    let mut tails: Vec<Vec<u8>> = Vec::with_capacity(values.len());
    for (value, schema) in values.iter().zip(schemas) {
        if schema.is_static() {
            heads.push(encode_static(value, schema)?);
            tails.push(Vec::new());
        } else {
            heads.push(vec![0u8; WORD]);
            tails.push(encode_dynamic(value, schema)?);
        }
    }

    let head_size: usize = heads.iter().map(Vec::len).sum();
    let mut out = Vec::with_capacity(head_size + tails.iter().map(Vec::len).sum::<usize>());
    let mut offset = head_size;
    for (i, schema) in schemas.iter().enumerate() {
        if schema.is_static() {
            out.extend_from_slice(&heads[i]);
        } else {
            out.extend_from_slice(&encode_uint_word(offset as u128));
            offset += tails[i].len();
        }
    }
    for tail in tails {
        out.extend_from_slice(&tail);
    }
    Ok(out)
}

/// Decodes a head/tail block into values, mirroring [`encode_list`].
pub fn decode_list(data: &[u8], schemas: &[Schema]) -> Result<Vec<Value>> {
    let mut values = Vec::with_capacity(schemas.len());
    let mut head_cursor = 0usize;
    for schema in schemas {
        if schema.is_static() {
            let width = static_width(schema);
            let word = read_slice(data, head_cursor, width)?;
            values.push(decode_static(word, schema)?);
            head_cursor += width;
        } else {
            let offset = read_offset(data, head_cursor)?;
            head_cursor += WORD;
            let tail = data.get(offset..).ok_or_else(|| {
                Error::AbiDecoding(format!(
                    "dynamic offset {offset} out of bounds (buffer is {} bytes)",
                    data.len()
                ))
            })?;
            values.push(decode_dynamic(tail, schema)?);
        }
    }
    Ok(values)
}

fn static_width(schema: &Schema) -> usize {
    match schema {
        Schema::Array(elem, Some(len)) => len * static_width(elem),
        Schema::Tuple(components) => components.iter().map(static_width).sum(),
        _ => WORD,
    }
}

fn encode_static(value: &Value, schema: &Schema) -> Result<Vec<u8>> {
    match (value, schema) {
        (Value::Uint(v), Schema::UInt(width)) => {
            if !uint_fits(v, *width) {
                return Err(Error::AbiEncoding(format!(
                    "value {v} does not fit in uint{width}"
                )));
            }
            Ok(v.to_be_bytes().to_vec())
        }
        (Value::Int(v), Schema::Int(width)) => {
            if !int_fits(v, *width) {
                return Err(Error::AbiEncoding(format!(
                    "value {v} does not fit in int{width}"
                )));
            }
            Ok(encode_int_word(v))
        }
        (Value::Address(a), Schema::Address) => {
            let mut word = vec![0u8; WORD];
            word[12..].copy_from_slice(a.as_bytes());
            Ok(word)
        }
        (Value::Bool(b), Schema::Bool) => {
            let mut word = vec![0u8; WORD];
            word[31] = *b as u8;
            Ok(word)
        }
        (Value::FixedBytes(bytes), Schema::FixedBytes(k)) => {
            if bytes.len() != *k as usize {
                return Err(Error::AbiEncoding(format!(
                    "expected {k} fixed bytes, got {}",
                    bytes.len()
                )));
            }
            let mut word = vec![0u8; WORD];
            word[..bytes.len()].copy_from_slice(bytes);
            Ok(word)
        }
        (Value::Array(items), Schema::Array(elem, Some(len))) => {
            if items.len() != *len {
                return Err(Error::AbiEncoding(format!(
                    "expected {len} array elements, got {}",
                    items.len()
                )));
            }
            let mut out = Vec::with_capacity(static_width(schema));
            for item in items {
                out.extend_from_slice(&encode_static(item, elem)?);
            }
            Ok(out)
        }
        (Value::Tuple(items), Schema::Tuple(components)) => {
            let mut out = Vec::with_capacity(static_width(schema));
            for (item, component) in items.iter().zip(components) {
                out.extend_from_slice(&encode_static(item, component)?);
            }
            Ok(out)
        }
        _ => Err(Error::AbiEncoding(format!(
            "value does not match schema {schema}"
        ))),
    }
}

fn decode_static(word: &[u8], schema: &Schema) -> Result<Value> {
    match schema {
        Schema::UInt(width) => {
            let mut buf = [0u8; 32];
            buf.copy_from_slice(&word[..32]);
            let value = Wei::from_be_bytes(&buf);
            if !uint_fits(&value, *width) {
                return Err(Error::AbiDecoding(format!(
                    "encoded value exceeds uint{width} range"
                )));
            }
            Ok(Value::Uint(value))
        }
        Schema::Int(width) => Ok(Value::Int(decode_int_word(&word[..32], *width)?)),
        Schema::Address => {
            if word[..12].iter().any(|&b| b != 0) {
                return Err(Error::AbiDecoding(
                    "address word has non-zero padding".to_string(),
                ));
            }
            Ok(Value::Address(Address::from_slice(&word[12..32])?))
        }
        Schema::Bool => {
            if word[..31].iter().any(|&b| b != 0) || word[31] > 1 {
                return Err(Error::AbiDecoding("malformed bool word".to_string()));
            }
            Ok(Value::Bool(word[31] == 1))
        }
        Schema::FixedBytes(k) => {
            let k = *k as usize;
            if word[k..32].iter().any(|&b| b != 0) {
                return Err(Error::AbiDecoding(
                    "fixed bytes word has non-zero padding".to_string(),
                ));
            }
            Ok(Value::FixedBytes(word[..k].to_vec()))
        }
        Schema::Array(elem, Some(len)) => {
            let width = static_width(elem);
            let mut items = Vec::with_capacity(*len);
            for i in 0..*len {
                items.push(decode_static(&word[i * width..(i + 1) * width], elem)?);
            }
            Ok(Value::Array(items))
        }
        Schema::Tuple(components) => {
            let mut items = Vec::with_capacity(components.len());
            let mut cursor = 0;
            for component in components {
                let width = static_width(component);
                items.push(decode_static(&word[cursor..cursor + width], component)?);
                cursor += width;
            }
            Ok(Value::Tuple(items))
        }
        Schema::DynamicBytes | Schema::String | Schema::Array(_, None) => unreachable!(
            "decode_static called on a dynamic schema: {schema}"
        ),
    }
}

fn encode_dynamic(value: &Value, schema: &Schema) -> Result<Vec<u8>> {
    match (value, schema) {
        (Value::Bytes(bytes), Schema::DynamicBytes) => Ok(encode_bytes_tail(bytes)),
        (Value::String(s), Schema::String) => Ok(encode_bytes_tail(s.as_bytes())),
        (Value::Array(items), Schema::Array(elem, None)) => {
            let schemas: Vec<Schema> = std::iter::repeat(elem.as_ref().clone())
                .take(items.len())
                .collect();
            let body = encode_list(items, &schemas)?;
            let mut out = encode_uint_word(items.len() as u128);
            out.extend_from_slice(&body);
            Ok(out)
        }
        (Value::Array(items), Schema::Array(elem, Some(len))) => {
            if items.len() != *len {
                return Err(Error::AbiEncoding(format!(
                    "expected {len} array elements, got {}",
                    items.len()
                )));
            }
            let schemas: Vec<Schema> = std::iter::repeat(elem.as_ref().clone()).take(*len).collect();
            encode_list(items, &schemas)
        }
        (Value::Tuple(items), Schema::Tuple(components)) => encode_list(items, components),
        _ => Err(Error::AbiEncoding(format!(
            "value does not match schema {schema}"
        ))),
    }
}

fn decode_dynamic(tail: &[u8], schema: &Schema) -> Result<Value> {
    match schema {
        Schema::DynamicBytes => Ok(Value::Bytes(decode_bytes_tail(tail)?)),
        Schema::String => {
            let bytes = decode_bytes_tail(tail)?;
            let s = String::from_utf8(bytes)
                .map_err(|e| Error::AbiDecoding(format!("invalid utf-8 string: {e}")))?;
            Ok(Value::String(s))
        }
        Schema::Array(elem, None) => {
            let len = read_offset(tail, 0)?;
            let body = tail.get(WORD..).ok_or_else(|| {
                Error::AbiDecoding("truncated dynamic array length prefix".to_string())
            })?;
            let schemas: Vec<Schema> = std::iter::repeat(elem.as_ref().clone()).take(len).collect();
            Ok(Value::Array(decode_list(body, &schemas)?))
        }
        Schema::Array(elem, Some(len)) => {
            let schemas: Vec<Schema> = std::iter::repeat(elem.as_ref().clone()).take(*len).collect();
            Ok(Value::Array(decode_list(tail, &schemas)?))
        }
        Schema::Tuple(components) => Ok(Value::Tuple(decode_list(tail, components)?)),
        _ => unreachable!("decode_dynamic called on a static schema: {schema}"),
    }
}

fn encode_bytes_tail(bytes: &[u8]) -> Vec<u8> {
    let mut out = encode_uint_word(bytes.len() as u128);
    out.extend_from_slice(bytes);
    let padding = (WORD - (bytes.len() % WORD)) % WORD;
    out.extend(std::iter::repeat(0u8).take(padding));
    out
}

fn decode_bytes_tail(tail: &[u8]) -> Result<Vec<u8>> {
    let len = read_offset(tail, 0)?;
    let bytes = tail.get(WORD..WORD + len).ok_or_else(|| {
        Error::AbiDecoding(format!(
            "declared length {len} exceeds remaining buffer ({} bytes)",
            tail.len().saturating_sub(WORD)
        ))
    })?;
    Ok(bytes.to_vec())
}

fn encode_uint_word(value: u128) -> Vec<u8> {
    let mut word = vec![0u8; WORD];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

fn read_slice<'a>(data: &'a [u8], offset: usize, len: usize) -> Result<&'a [u8]> {
    data.get(offset..offset + len).ok_or_else(|| {
        Error::AbiDecoding(format!(
            "truncated head: need {len} bytes at offset {offset}, buffer is {} bytes",
            data.len()
        ))
    })
}

fn read_offset(data: &[u8], at: usize) -> Result<usize> {
    let word = read_slice(data, at, WORD)?;
    if word[..16].iter().any(|&b| b != 0) {
        return Err(Error::AbiDecoding("offset/length exceeds usize range".to_string()));
    }
    let mut buf = [0u8; 16];
    buf.copy_from_slice(&word[16..]);
    Ok(u128::from_be_bytes(buf) as usize)
}

fn uint_fits(value: &Wei, width: u16) -> bool {
    if width >= 256 {
        return true;
    }
    let bytes = value.to_be_bytes();
    let allowed_bits = width as u32;
    let total_bits = 256u32;
    let clear_bits = total_bits - allowed_bits;
    let clear_bytes = (clear_bits / 8) as usize;
    let remaining_bits = clear_bits % 8;
    if bytes[..clear_bytes].iter().any(|&b| b != 0) {
        return false;
    }
    if remaining_bits > 0 {
        let mask = 0xffu8 << (8 - remaining_bits);
        if bytes[clear_bytes] & mask != 0 {
            return false;
        }
    }
    true
}

fn int_fits(value: &Int256, width: u16) -> bool {
    value.fits_in_bits(width as u32)
}

fn encode_int_word(value: &Int256) -> Vec<u8> {
    value.to_be_bytes().to_vec()
}

fn decode_int_word(word: &[u8], width: u16) -> Result<Int256> {
    let mut buf = [0u8; 32];
    buf.copy_from_slice(&word[..32]);
    let value = Int256::from_be_bytes(&buf);
    if !int_fits(&value, width) {
        return Err(Error::AbiDecoding(format!(
            "encoded value exceeds int{width} range"
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_scalar_arguments() {
        let schemas = vec![Schema::uint256(), Schema::Address, Schema::Bool];
        let values = vec![
            Value::uint(42u64),
            Value::Address(Address::from_hex("0x0000000000000000000000000000000000000001").unwrap()),
            Value::Bool(true),
        ];
        let encoded = encode_list(&values, &schemas).unwrap();
        assert_eq!(encoded.len(), 96);
        let decoded = decode_list(&encoded, &schemas).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn round_trips_dynamic_string_and_bytes() {
        let schemas = vec![Schema::String, Schema::DynamicBytes];
        let values = vec![
            Value::String("hello, evm".to_string()),
            Value::Bytes(vec![0xde, 0xad, 0xbe, 0xef]),
        ];
        let encoded = encode_list(&values, &schemas).unwrap();
        let decoded = decode_list(&encoded, &schemas).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn round_trips_dynamic_array_of_tuples() {
        let tuple_schema = Schema::Tuple(vec![Schema::Address, Schema::uint256()]);
        let schemas = vec![Schema::array(tuple_schema.clone())];
        let values = vec![Value::Array(vec![
            Value::Tuple(vec![Value::Address(Address::ZERO), Value::uint(1u64)]),
            Value::Tuple(vec![Value::Address(Address::ZERO), Value::uint(2u64)]),
        ])];
        let encoded = encode_list(&values, &schemas).unwrap();
        let decoded = decode_list(&encoded, &schemas).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn rejects_uint_overflowing_its_width() {
        let schema = Schema::UInt(8);
        let value = Value::uint(256u64);
        assert!(encode_static(&value, &schema).is_err());
    }

    #[test]
    fn rejects_out_of_bounds_dynamic_offset() {
        let schemas = vec![Schema::String];
        let mut malformed = vec![0u8; 32];
        // offset points past the end of the buffer
        malformed[31] = 200;
        assert!(decode_list(&malformed, &schemas).is_err());
    }

    #[test]
    fn int_round_trip_negative() {
        let schemas = vec![Schema::Int(256)];
        let values = vec![Value::int(-42i128)];
        let encoded = encode_list(&values, &schemas).unwrap();
        let decoded = decode_list(&encoded, &schemas).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn int_round_trip_below_i128_min() {
        // type(int256).min: sign bit set, every other bit zero.
        let mut bytes = [0u8; 32];
        bytes[0] = 0x80;
        let min_int256 = Int256::from_be_bytes(&bytes);
        let schemas = vec![Schema::Int(256)];
        let values = vec![Value::Int(min_int256)];
        let encoded = encode_list(&values, &schemas).unwrap();
        let decoded = decode_list(&encoded, &schemas).unwrap();
        assert_eq!(decoded, values);
    }
}
