//! Keccak-256.
//!
//! Exposes a free [`hash`] function and an optional per-context [`Hasher`]
//! for callers who want to reuse hashing state across many calls. Pooling is
//! a caller-side convenience, never a correctness requirement: [`hash`]
//! allocates fresh state every call and is always safe to use from any
//! thread.

use sha3::{Digest, Keccak256};

/// Hashes `data` with Keccak-256 (not SHA3-256 — Ethereum uses the original
/// Keccak padding).
pub fn hash(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let out = hasher.finalize();
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&out);
    bytes
}

/// A reusable Keccak-256 state for callers that hash many preimages in a
/// tight loop (e.g. the ABI codec computing selectors for a large method
/// table at bind time).
///
/// Reuse is an optimization, not a contract: each [`Hasher`] is exclusively
/// owned by the thread that created it, and [`Hasher::cleanup`] simply drops
/// and reallocates the inner state so pooled/worker-thread callers can
/// release it on teardown.
pub struct Hasher {
    inner: Keccak256,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Creates a fresh hasher.
    pub fn new() -> Self {
        Self {
            inner: Keccak256::new(),
        }
    }

    /// Hashes `data`, consuming and resetting the internal state.
    pub fn hash_once(&mut self, data: &[u8]) -> [u8; 32] {
        self.inner.update(data);
        let out = std::mem::replace(&mut self.inner, Keccak256::new()).finalize();
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&out);
        bytes
    }

    /// Releases the internal hashing state. Safe to call from a pooled
    /// worker thread before returning the `Hasher` (or itself) to a pool.
    pub fn cleanup(&mut self) {
        self.inner = Keccak256::new();
    }
}
