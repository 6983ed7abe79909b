//! Read-only JSON-RPC operations.

use std::sync::OnceLock;

use ethereal_primitives::{Address, BlockTag, Error, Hash, HexData, Result, Wei};
use ethereal_transport::Provider;
use serde_json::json;

use crate::retry::RpcRetry;
use crate::wire::{AccessListResult, Block, CallRequest, Log, LogFilter, Receipt, TransactionInfo};

/// Read-only facade over a single node connection.
///
/// `chain_id()` is memoized in a [`OnceLock`]: the first successful fetch
/// wins the race and every later call (concurrent or not) observes that
/// same value without further I/O.
pub struct Reader {
    provider: Provider,
    chain_id: OnceLock<u64>,
    retry: RpcRetry,
}

impl Reader {
    pub fn new(provider: Provider) -> Self {
        Reader {
            provider,
            chain_id: OnceLock::new(),
            retry: RpcRetry::default(),
        }
    }

    pub fn with_retry(mut self, retry: RpcRetry) -> Self {
        self.retry = retry;
        self
    }

    pub(crate) async fn request(&self, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
        self.retry
            .run(|| async { self.provider.request(method, params.clone()).await })
            .await
    }

    /// The chain id, fetched once and cached for the reader's lifetime.
    pub async fn chain_id(&self) -> Result<u64> {
        if let Some(id) = self.chain_id.get() {
            return Ok(*id);
        }
        let response = self.request("eth_chainId", json!([])).await?;
        let hex = response
            .as_str()
            .ok_or_else(|| Error::Malformed("eth_chainId did not return a string".to_string()))?;
        let id = ethereal_primitives::hex::decode_u64_quantity(hex)?;
        // If a concurrent caller already set it, defer to whichever value
        // won; both were queried against the same node and must agree.
        Ok(*self.chain_id.get_or_init(|| id))
    }

    pub async fn latest_block(&self) -> Result<Block> {
        self.block_by_number(BlockTag::LATEST).await
    }

    pub async fn block_by_number(&self, tag: BlockTag) -> Result<Block> {
        let response = self
            .request("eth_getBlockByNumber", json!([tag.to_rpc_param(), false]))
            .await?;
        serde_json::from_value(response).map_err(|e| Error::Malformed(format!("malformed block: {e}")))
    }

    pub async fn balance_of(&self, address: Address, tag: BlockTag) -> Result<Wei> {
        let response = self
            .request("eth_getBalance", json!([address, tag.to_rpc_param()]))
            .await?;
        let hex = response
            .as_str()
            .ok_or_else(|| Error::Malformed("eth_getBalance did not return a string".to_string()))?;
        Wei::from_hex(hex)
    }

    pub async fn call(&self, request: &CallRequest, tag: BlockTag) -> Result<HexData> {
        let response = self
            .request("eth_call", json!([request, tag.to_rpc_param()]))
            .await
            .map_err(classify_revert)?;
        let hex = response
            .as_str()
            .ok_or_else(|| Error::Malformed("eth_call did not return a string".to_string()))?;
        HexData::from_hex(hex)
    }

    /// Estimates gas for `request`. A failure whose
    /// RPC error carries revert data surfaces as [`Error::Revert`]; any
    /// other failure surfaces as-is (usually [`Error::Rpc`]).
    pub async fn estimate_gas(&self, request: &CallRequest) -> Result<u64> {
        let response = self
            .request("eth_estimateGas", json!([request]))
            .await
            .map_err(classify_revert)?;
        let hex = response
            .as_str()
            .ok_or_else(|| Error::Malformed("eth_estimateGas did not return a string".to_string()))?;
        ethereal_primitives::hex::decode_u64_quantity(hex)
    }

    pub async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<Log>> {
        let response = self.request("eth_getLogs", json!([filter])).await?;
        serde_json::from_value(response).map_err(|e| Error::Malformed(format!("malformed logs: {e}")))
    }

    pub async fn tx_by_hash(&self, hash: Hash) -> Result<Option<TransactionInfo>> {
        let response = self
            .request("eth_getTransactionByHash", json!([hash]))
            .await?;
        if response.is_null() {
            return Ok(None);
        }
        serde_json::from_value(response)
            .map(Some)
            .map_err(|e| Error::Malformed(format!("malformed transaction: {e}")))
    }

    pub async fn receipt(&self, hash: Hash) -> Result<Option<Receipt>> {
        let response = self
            .request("eth_getTransactionReceipt", json!([hash]))
            .await?;
        if response.is_null() {
            return Ok(None);
        }
        serde_json::from_value(response)
            .map(Some)
            .map_err(|e| Error::Malformed(format!("malformed receipt: {e}")))
    }

    pub async fn create_access_list(&self, request: &CallRequest, tag: BlockTag) -> Result<AccessListResult> {
        let response = self
            .request("eth_createAccessList", json!([request, tag.to_rpc_param()]))
            .await
            .map_err(classify_revert)?;
        serde_json::from_value(response)
            .map_err(|e| Error::Malformed(format!("malformed access list result: {e}")))
    }

    pub async fn gas_price(&self) -> Result<Wei> {
        let response = self.request("eth_gasPrice", json!([])).await?;
        let hex = response
            .as_str()
            .ok_or_else(|| Error::Malformed("eth_gasPrice did not return a string".to_string()))?;
        Wei::from_hex(hex)
    }
}

/// If `error` is a [`Error::Rpc`] carrying hex revert data, decode it and
/// return [`Error::Revert`] instead; otherwise pass `error` through
/// untouched. A revert surfacing through the node's error channel must
/// never be retried as if it were a transport failure.
pub(crate) fn classify_revert(error: Error) -> Error {
    let Error::Rpc(rpc) = &error else {
        return error;
    };
    let Some(data) = &rpc.data else {
        return error;
    };
    match ethereal_primitives::hex::decode(data) {
        Ok(bytes) => Error::Revert(ethereal_abi::decode_revert(&bytes)),
        Err(_) => error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethereal_primitives::error::RpcError;

    #[test]
    fn classifies_rpc_error_with_revert_data() {
        let payload = ethereal_abi::encode_error("denied");
        let error = Error::Rpc(RpcError {
            code: -32000,
            message: "execution reverted".to_string(),
            data: Some(ethereal_primitives::hex::encode_prefixed(&payload)),
        });
        match classify_revert(error) {
            Error::Revert(info) => assert_eq!(info.reason.as_deref(), Some("denied")),
            other => panic!("expected Revert, got {other:?}"),
        }
    }

    #[test]
    fn passes_through_rpc_errors_without_revert_data() {
        let error = Error::Rpc(RpcError {
            code: -32602,
            message: "invalid params".to_string(),
            data: None,
        });
        assert!(matches!(classify_revert(error), Error::Rpc(_)));
    }
}
