//! Multicall3 deployment-address registry.
//!
//! Multicall3 is deployed at the same address on essentially every EVM
//! chain via a deterministic CREATE2 factory, so the registry's only job is
//! to let a caller override that address for the rare chain that lacks the
//! canonical deployment (or uses a private fork with a different one).

use std::collections::HashMap;

use ethereal_primitives::Address;

const MULTICALL3_BYTES: [u8; 20] = [
    0xca, 0x11, 0xbd, 0xe0, 0x59, 0x77, 0xb3, 0x63, 0x11, 0x67, 0x02, 0x88, 0x62, 0xbe, 0x2a, 0x17, 0x39, 0x76, 0xca,
    0x11,
];

/// The canonical `0xcA11bde05977b3631167028862bE2a173976CA11` address.
pub fn default_multicall3_address() -> Address {
    Address::from_bytes(MULTICALL3_BYTES)
}

/// Per-chain Multicall3 addresses, defaulting to the canonical address for
/// any chain id not explicitly overridden.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    overrides: HashMap<u64, Address>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    pub fn with_override(mut self, chain_id: u64, address: Address) -> Self {
        self.overrides.insert(chain_id, address);
        self
    }

    pub fn address_for(&self, chain_id: u64) -> Address {
        self.overrides
            .get(&chain_id)
            .copied()
            .unwrap_or_else(default_multicall3_address)
    }
}
