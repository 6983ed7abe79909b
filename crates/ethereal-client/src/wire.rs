//! JSON-RPC request/response shapes for the reader surface.

use ethereal_primitives::{Address, Hash, HexData, Wei};
use ethereal_tx::AccessList;
use serde::de::Deserializer;
use serde::{Deserialize, Serialize};

fn de_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let s = String::deserialize(deserializer)?;
    ethereal_primitives::hex::decode_u64_quantity(&s).map_err(serde::de::Error::custom)
}

fn de_opt_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) => ethereal_primitives::hex::decode_u64_quantity(&s)
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// An `eth_getBlockByNumber`/`eth_getBlockByHash` result, transaction objects
/// omitted (the node is always queried with `fullTransactions = false`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub hash: Option<Hash>,
    pub parent_hash: Hash,
    #[serde(deserialize_with = "de_opt_u64")]
    pub number: Option<u64>,
    #[serde(deserialize_with = "de_u64")]
    pub timestamp: u64,
    #[serde(deserialize_with = "de_u64")]
    pub gas_limit: u64,
    #[serde(deserialize_with = "de_u64")]
    pub gas_used: u64,
    pub base_fee_per_gas: Option<Wei>,
    pub miner: Address,
    pub transactions: Vec<Hash>,
}

/// An `eth_getLogs`/receipt log entry.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Log {
    pub address: Address,
    pub topics: Vec<Hash>,
    pub data: HexData,
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub block_number: Option<u64>,
    pub transaction_hash: Option<Hash>,
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub log_index: Option<u64>,
    #[serde(default)]
    pub removed: bool,
}

/// An `eth_getTransactionByHash` result.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInfo {
    pub hash: Hash,
    pub from: Address,
    pub to: Option<Address>,
    #[serde(deserialize_with = "de_u64")]
    pub nonce: u64,
    pub value: Wei,
    #[serde(deserialize_with = "de_u64")]
    pub gas: u64,
    pub gas_price: Option<Wei>,
    pub max_fee_per_gas: Option<Wei>,
    pub max_priority_fee_per_gas: Option<Wei>,
    pub input: HexData,
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub block_number: Option<u64>,
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub transaction_index: Option<u64>,
}

/// An `eth_getTransactionReceipt` result.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub transaction_hash: Hash,
    pub block_hash: Hash,
    #[serde(deserialize_with = "de_u64")]
    pub block_number: u64,
    pub from: Address,
    pub to: Option<Address>,
    #[serde(deserialize_with = "de_u64")]
    pub cumulative_gas_used: u64,
    #[serde(deserialize_with = "de_u64")]
    pub gas_used: u64,
    pub contract_address: Option<Address>,
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub status: Option<u64>,
    pub logs: Vec<Log>,
    pub effective_gas_price: Option<Wei>,
}

impl Receipt {
    /// `true` when the node reported `status == 1` (or omitted status, for
    /// pre-Byzantium nodes that never fail a receipt this way).
    pub fn succeeded(&self) -> bool {
        !matches!(self.status, Some(0))
    }
}

/// The `eth_createAccessList` result: the suggested access list plus the
/// gas the node estimates the call would use with it applied.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessListResult {
    pub access_list: AccessList,
    #[serde(deserialize_with = "de_u64")]
    pub gas_used: u64,
}

/// The `eth_call`/`eth_estimateGas`/`eth_createAccessList` request object.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas: Option<Wei>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<Wei>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_fee_per_gas: Option<Wei>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_priority_fee_per_gas: Option<Wei>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Wei>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<HexData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_list: Option<AccessList>,
}

/// Filter parameters for `eth_getLogs`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_block: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_block: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<Option<Hash>>>,
}
