use ethereal_primitives::error::{RevertInfo, RevertKind};
use ethereal_primitives::hex;

use crate::codec::{decode_list, encode_list};
use crate::schema::Schema;
use crate::value::Value;

const ERROR_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];
const PANIC_SELECTOR: [u8; 4] = [0x4e, 0x48, 0x7b, 0x71];

/// Maps a well-known `Panic(uint256)` code to its human-readable reason.
fn panic_reason(code: u64) -> Option<&'static str> {
    Some(match code {
        0x01 => "assertion failed",
        0x11 => "arithmetic over/underflow",
        0x12 => "division or modulo by zero",
        0x21 => "invalid enum conversion",
        0x22 => "invalid storage byte array access",
        0x31 => "pop on an empty array",
        0x32 => "array index out of bounds",
        0x41 => "out-of-memory allocation too large",
        0x51 => "call to a zero-initialized internal function pointer",
        _ => return None,
    })
}

/// Decodes a raw revert payload (the `data` field of a reverted call) into
/// a [`RevertInfo`]. Never fails: anything that doesn't parse as a known
/// shape degrades to `CUSTOM`, and an empty payload degrades to `UNKNOWN`.
pub fn decode_revert(payload: &[u8]) -> RevertInfo {
    let raw_hex = hex::encode_prefixed(payload);

    if payload.is_empty() {
        return RevertInfo {
            kind: RevertKind::Unknown,
            reason: None,
            raw_hex,
        };
    }

    if payload.len() >= 4 && payload[..4] == ERROR_SELECTOR {
        if let Some(reason) = decode_error_string(&payload[4..]) {
            return RevertInfo {
                kind: RevertKind::Error,
                reason: Some(reason),
                raw_hex,
            };
        }
    }

    if payload.len() >= 4 && payload[..4] == PANIC_SELECTOR {
        if let Some(code) = decode_panic_code(&payload[4..]) {
            let reason = panic_reason(code)
                .map(|r| r.to_string())
                .unwrap_or_else(|| format!("unrecognized panic code 0x{code:02x}"));
            return RevertInfo {
                kind: RevertKind::Panic,
                reason: Some(reason),
                raw_hex,
            };
        }
    }

    RevertInfo {
        kind: RevertKind::Custom,
        reason: None,
        raw_hex,
    }
}

fn decode_error_string(args: &[u8]) -> Option<String> {
    let decoded = decode_list(args, &[Schema::String]).ok()?;
    match decoded.into_iter().next()? {
        Value::String(s) => Some(s),
        _ => None,
    }
}

fn decode_panic_code(args: &[u8]) -> Option<u64> {
    let decoded = decode_list(args, &[Schema::uint256()]).ok()?;
    match decoded.into_iter().next()? {
        Value::Uint(v) => v.try_into_u64().ok(),
        _ => None,
    }
}

/// Builds the calldata for a standard `Error(string)` revert, useful for
/// tests that simulate a node's revert response.
pub fn encode_error(reason: &str) -> Vec<u8> {
    let mut out = ERROR_SELECTOR.to_vec();
    out.extend(encode_list(&[Value::String(reason.to_string())], &[Schema::String]).unwrap());
    out
}

/// Builds the calldata for a standard `Panic(uint256)` revert.
pub fn encode_panic(code: u64) -> Vec<u8> {
    let mut out = PANIC_SELECTOR.to_vec();
    out.extend(encode_list(&[Value::uint(code)], &[Schema::uint256()]).unwrap());
    out
}
