//! Sealed error taxonomy shared by every crate in the toolkit.
//!
//! Every fallible operation returns a [`Result<T>`] built on this [`Error`].
//! Variants are programmatically matchable and their `Display` messages never
//! include secret material (no private-key bytes ever reach a message).

use std::fmt;

/// Result alias used throughout the toolkit.
pub type Result<T> = std::result::Result<T, Error>;

/// The revert classification attached to [`Error::Revert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevertKind {
    /// `Error(string)` — selector `0x08c379a0`.
    Error,
    /// `Panic(uint256)` — selector `0x4e487b71`.
    Panic,
    /// Anything else with a recognized 4-byte selector.
    Custom,
    /// Empty revert payload.
    Unknown,
}

impl fmt::Display for RevertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RevertKind::Error => "ERROR",
            RevertKind::Panic => "PANIC",
            RevertKind::Custom => "CUSTOM",
            RevertKind::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// A decoded (or best-effort) EVM revert payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevertInfo {
    /// Which of the well-known revert shapes this payload matched.
    pub kind: RevertKind,
    /// The human-readable reason, when one could be extracted.
    pub reason: Option<String>,
    /// The raw revert bytes, `0x`-prefixed hex.
    pub raw_hex: String,
}

impl fmt::Display for RevertInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            Some(reason) => write!(f, "{} revert: {}", self.kind, reason),
            None => write!(f, "{} revert: {}", self.kind, self.raw_hex),
        }
    }
}

/// A single JSON-RPC error frame, `{code, message, data?}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    pub data: Option<String>,
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rpc error {}: {}", self.code, self.message)
    }
}

/// The sealed error hierarchy for the `ethereal` toolkit.
///
/// This enum is intentionally non-`#[non_exhaustive]` within the crate tree
/// (the hierarchy is closed by design) but downstream consumers should
/// still match with a wildcard arm, since new transport/runtime variants may
/// be added across minor versions.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Caller supplied values that cannot be ABI-encoded under the declared
    /// schema (type mismatch, width overflow, negative value in a `uint`,
    /// wrong tuple arity).
    #[error("abi encoding error: {0}")]
    AbiEncoding(String),

    /// A node response could not be parsed under the declared ABI schema
    /// (out-of-bounds offset, unpadded tail, wrong selector).
    #[error("abi decoding error: {0}")]
    AbiDecoding(String),

    /// RLP payload could not be decoded (malformed length header, trailing
    /// garbage, non-canonical encoding).
    #[error("rlp error: {0}")]
    Rlp(String),

    /// A JSON-RPC error frame was returned by the node.
    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// The EVM reverted execution.
    #[error(transparent)]
    Revert(#[from] RevertInfo),

    /// Transaction construction failed (missing `from`, missing `to`/`data`
    /// for a call, gas too low, invariant violation).
    #[error("transaction error: {0}")]
    Transaction(String),

    /// A user-supplied `chain_id` disagreed with the cached or node-reported
    /// id.
    #[error("chain id mismatch: expected {expected}, got {got}")]
    ChainMismatch { expected: u64, got: u64 },

    /// The signer's recovered address differs from the request's `from`
    /// field.
    #[error("invalid sender: expected {expected}, signer is {actual}")]
    InvalidSender { expected: String, actual: String },

    /// A blocking call exceeded its deadline.
    #[error("operation timed out")]
    Timeout,

    /// An in-flight request was cancelled before completion.
    #[error("operation cancelled")]
    Cancelled,

    /// The transport's correlation table has no free slot, or a configured
    /// queue-depth/memory watermark tripped.
    #[error("backpressure: slot {slot} occupied ({occupancy} in flight)")]
    Backpressure { slot: usize, occupancy: usize },

    /// The underlying connection was lost; all outstanding requests on it
    /// have been failed.
    #[error("connection lost")]
    ConnectionLost,

    /// The provider has been closed.
    #[error("provider closed")]
    Closed,

    /// A [`crate::types::PrivateKey`] was used after `destroy()`.
    #[error("private key has been destroyed")]
    Invalidated,

    /// The retry wrapper exhausted its attempt budget.
    #[error("retry exhausted after {attempts} attempts: {}", join_causes(.causes))]
    RetryExhausted {
        attempts: usize,
        causes: Vec<String>,
    },

    /// Malformed hex input (odd length, invalid digit).
    #[error("malformed hex input: {0}")]
    Malformed(String),

    /// An I/O-level transport failure (connection refused, reset, HTTP
    /// error). Distinguished from [`Error::Rpc`] so the retry wrapper can
    /// tell apart node-level reverts from transport hiccups.
    #[error("io error: {0}")]
    Io(String),
}

fn join_causes(causes: &[String]) -> String {
    causes.join(" -> ")
}

impl Error {
    /// True for failures the retry wrapper is allowed to retry: I/O-class
    /// failures and a narrow allow-list of JSON-RPC codes, provided no
    /// revert data is attached. Revert data always short-circuits retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Io(_) | Error::ConnectionLost | Error::Timeout => true,
            Error::Rpc(RpcError { code, data, .. }) => {
                data.is_none() && matches!(code, -32000 | -32005 | -32016 | -32603)
            }
            _ => false,
        }
    }
}
