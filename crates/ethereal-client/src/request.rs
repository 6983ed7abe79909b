//! Caller-facing request shapes for the signer surface.

use ethereal_primitives::{Address, HexData, Wei};
use ethereal_tx::AccessList;

/// A write request: the caller-visible union of a plain transfer and a
/// contract call, before the gas strategy fills in what's missing.
#[derive(Debug, Clone, Default)]
pub struct TransactionRequest {
    pub to: Option<Address>,
    pub value: Wei,
    pub data: HexData,
    pub gas_limit: Option<u64>,
    pub max_fee_per_gas: Option<Wei>,
    pub max_priority_fee_per_gas: Option<Wei>,
    pub access_list: AccessList,
    /// Must match the signer's cached chain id if present.
    pub chain_id: Option<u64>,
}

impl TransactionRequest {
    pub fn call(to: Address, data: HexData) -> Self {
        TransactionRequest {
            to: Some(to),
            data,
            ..Default::default()
        }
    }

    pub fn transfer(to: Address, value: Wei) -> Self {
        TransactionRequest {
            to: Some(to),
            value,
            ..Default::default()
        }
    }

    pub fn with_value(mut self, value: Wei) -> Self {
        self.value = value;
        self
    }
}
