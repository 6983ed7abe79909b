use ethereal_primitives::Error;

use crate::Result;

/// A single RLP value: a byte-string or a list of further items.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Item {
    String(Vec<u8>),
    List(Vec<Item>),
}

impl Item {
    /// Borrows the inner bytes, failing if this item is a list.
    pub fn as_string(&self) -> Result<&[u8]> {
        match self {
            Item::String(bytes) => Ok(bytes),
            Item::List(_) => Err(Error::Rlp("expected a string item, found a list".to_string())),
        }
    }

    /// Borrows the inner items, failing if this item is a string.
    pub fn as_list(&self) -> Result<&[Item]> {
        match self {
            Item::List(items) => Ok(items),
            Item::String(_) => Err(Error::Rlp("expected a list item, found a string".to_string())),
        }
    }

    pub(crate) fn encode_into(&self, out: &mut Vec<u8>) {
        match self {
            Item::String(bytes) => encode_string(bytes, out),
            Item::List(items) => {
                let mut body = Vec::new();
                for item in items {
                    item.encode_into(&mut body);
                }
                encode_header(0xc0, body.len(), out);
                out.extend_from_slice(&body);
            }
        }
    }

    pub(crate) fn decode_from(input: &[u8]) -> Result<(Item, &[u8])> {
        let (prefix, rest) = input
            .split_first()
            .ok_or_else(|| Error::Rlp("unexpected end of input".to_string()))?;
        match *prefix {
            0x00..=0x7f => Ok((Item::String(vec![*prefix]), rest)),
            0x80..=0xb7 => {
                let len = (*prefix - 0x80) as usize;
                let (body, rest) = take(rest, len)?;
                if len == 1 && body[0] < 0x80 {
                    return Err(Error::Rlp(
                        "non-canonical encoding: single byte below 0x80 must not be string-prefixed".to_string(),
                    ));
                }
                Ok((Item::String(body.to_vec()), rest))
            }
            0xb8..=0xbf => {
                let len_of_len = (*prefix - 0xb7) as usize;
                let (len_bytes, rest) = take(rest, len_of_len)?;
                let len = decode_length(len_bytes)?;
                if len <= 55 {
                    return Err(Error::Rlp(
                        "non-canonical length encoding: long form used for length <= 55".to_string(),
                    ));
                }
                let (body, rest) = take(rest, len)?;
                Ok((Item::String(body.to_vec()), rest))
            }
            0xc0..=0xf7 => {
                let len = (*prefix - 0xc0) as usize;
                let (body, rest) = take(rest, len)?;
                Ok((Item::List(decode_list_body(body)?), rest))
            }
            0xf8..=0xff => {
                let len_of_len = (*prefix - 0xf7) as usize;
                let (len_bytes, rest) = take(rest, len_of_len)?;
                let len = decode_length(len_bytes)?;
                if len <= 55 {
                    return Err(Error::Rlp(
                        "non-canonical length encoding: long form used for length <= 55".to_string(),
                    ));
                }
                let (body, rest) = take(rest, len)?;
                Ok((Item::List(decode_list_body(body)?), rest))
            }
        }
    }
}

fn take(input: &[u8], len: usize) -> Result<(&[u8], &[u8])> {
    if input.len() < len {
        return Err(Error::Rlp(format!(
            "truncated input: need {len} bytes, have {}",
            input.len()
        )));
    }
    Ok(input.split_at(len))
}

fn decode_list_body(mut body: &[u8]) -> Result<Vec<Item>> {
    let mut items = Vec::new();
    while !body.is_empty() {
        let (item, rest) = Item::decode_from(body)?;
        items.push(item);
        body = rest;
    }
    Ok(items)
}

fn decode_length(bytes: &[u8]) -> Result<usize> {
    if bytes.is_empty() {
        return Err(Error::Rlp("empty length field".to_string()));
    }
    if bytes[0] == 0 {
        return Err(Error::Rlp(
            "non-canonical length encoding: leading zero byte".to_string(),
        ));
    }
    if bytes.len() > std::mem::size_of::<usize>() {
        return Err(Error::Rlp("length field too wide".to_string()));
    }
    let mut value: usize = 0;
    for &b in bytes {
        value = value
            .checked_shl(8)
            .ok_or_else(|| Error::Rlp("length field overflow".to_string()))?;
        value |= b as usize;
    }
    Ok(value)
}

fn encode_string(bytes: &[u8], out: &mut Vec<u8>) {
    if bytes.len() == 1 && bytes[0] < 0x80 {
        out.push(bytes[0]);
        return;
    }
    encode_header(0x80, bytes.len(), out);
    out.extend_from_slice(bytes);
}

/// Writes the length header for a string (`short_base = 0x80`) or list
/// (`short_base = 0xc0`) payload of `len` bytes.
fn encode_header(short_base: u8, len: usize, out: &mut Vec<u8>) {
    if len <= 55 {
        out.push(short_base + len as u8);
    } else {
        let len_bytes = minimal_be_bytes(len as u64);
        out.push(short_base + 0x37 + len_bytes.len() as u8);
        out.extend_from_slice(&len_bytes);
    }
}

fn minimal_be_bytes(value: u64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let first_nonzero = bytes.iter().position(|&b| b != 0).unwrap_or(7);
    bytes[first_nonzero..].to_vec()
}
