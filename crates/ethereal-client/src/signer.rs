//! Transaction construction, gas strategy, broadcast, and receipt polling.

use std::time::{Duration, Instant};

use ethereal_crypto::PrivateKey;
use ethereal_primitives::{Address, BlockTag, Error, Hash, Result, Wei};
use ethereal_tx::{Eip1559Tx, LegacyTx, Transaction};

use crate::gas::{apply_gas_buffer, suggest_fees, DEFAULT_GAS_BUFFER_PCT};
use crate::reader::{classify_revert, Reader};
use crate::request::TransactionRequest;
use crate::wire::{CallRequest, Receipt};

const DEFAULT_RECEIPT_TIMEOUT: Duration = Duration::from_secs(120);
const DEFAULT_RECEIPT_POLL: Duration = Duration::from_millis(500);

/// A signing account layered over a [`Reader`]'s connection.
pub struct Signer {
    reader: Reader,
    key: PrivateKey,
    gas_buffer_pct: u64,
    default_priority_fee: Wei,
}

impl Signer {
    pub fn new(reader: Reader, key: PrivateKey) -> Self {
        Signer {
            reader,
            key,
            gas_buffer_pct: DEFAULT_GAS_BUFFER_PCT,
            default_priority_fee: Wei::from_gwei("1").unwrap_or(Wei::ZERO),
        }
    }

    pub fn with_gas_buffer_pct(mut self, buffer_pct: u64) -> Self {
        self.gas_buffer_pct = buffer_pct;
        self
    }

    pub fn with_default_priority_fee(mut self, fee: Wei) -> Self {
        self.default_priority_fee = fee;
        self
    }

    pub fn reader(&self) -> &Reader {
        &self.reader
    }

    pub fn address(&self) -> Result<Address> {
        self.key.address()
    }

    /// Builds, signs, and broadcasts `request`, returning the transaction
    /// hash without waiting for a receipt.
    pub async fn send_transaction(&self, request: TransactionRequest) -> Result<Hash> {
        let chain_id = self.reader.chain_id().await?;
        if let Some(requested) = request.chain_id {
            if requested != chain_id {
                return Err(Error::ChainMismatch {
                    expected: chain_id,
                    got: requested,
                });
            }
        }

        let from = self.address()?;
        let nonce = self.next_nonce(from).await?;
        let transaction = self.build_transaction(&request, chain_id, nonce).await?;
        let envelope = transaction.sign(&self.key, chain_id)?;
        let raw = ethereal_primitives::hex::encode_prefixed(&envelope);

        let response = self.reader.request("eth_sendRawTransaction", serde_json::json!([raw])).await?;
        let hex = response
            .as_str()
            .ok_or_else(|| Error::Malformed("eth_sendRawTransaction did not return a string".to_string()))?;
        Hash::from_hex(hex)
    }

    /// Sends `request`, then polls for its receipt, replaying a failed
    /// transaction via `eth_call` to recover its revert reason.
    pub async fn send_transaction_and_wait(
        &self,
        request: TransactionRequest,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Result<Receipt> {
        let hash = self.send_transaction(request).await?;
        self.wait_for_receipt(hash, timeout, poll_interval).await
    }

    /// Default-timeout/poll-interval convenience wrapper.
    pub async fn send_transaction_and_wait_default(&self, request: TransactionRequest) -> Result<Receipt> {
        self.send_transaction_and_wait(request, DEFAULT_RECEIPT_TIMEOUT, DEFAULT_RECEIPT_POLL)
            .await
    }

    async fn wait_for_receipt(&self, hash: Hash, timeout: Duration, poll_interval: Duration) -> Result<Receipt> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(receipt) = self.reader.receipt(hash).await? {
                if receipt.succeeded() {
                    return Ok(receipt);
                }
                return Err(self.revert_for_failed_receipt(&receipt).await);
            }
            if Instant::now() >= deadline {
                return Err(Error::Timeout);
            }
            tokio::time::sleep(poll_interval).await;
        }
    }

    /// Replays the failed transaction as a historical `eth_call` at the
    /// receipt's block to recover the revert payload. If the replay
    /// unexpectedly succeeds, the defect is itself reported as a revert,
    /// never silently swallowed.
    async fn revert_for_failed_receipt(&self, receipt: &Receipt) -> Error {
        let request = CallRequest {
            from: Some(receipt.from),
            to: receipt.to,
            ..Default::default()
        };
        let tag = BlockTag::number(receipt.block_number);
        match self.reader.call(&request, tag).await {
            Ok(_) => Error::Revert(ethereal_primitives::error::RevertInfo {
                kind: ethereal_primitives::error::RevertKind::Unknown,
                reason: Some("receipt says failed but replay succeeded".to_string()),
                raw_hex: "0x".to_string(),
            }),
            Err(revert @ Error::Revert(_)) => revert,
            Err(other) => other,
        }
    }

    async fn next_nonce(&self, from: Address) -> Result<u64> {
        let response = self
            .reader
            .request("eth_getTransactionCount", serde_json::json!([from, BlockTag::PENDING.to_rpc_param()]))
            .await?;
        let hex = response
            .as_str()
            .ok_or_else(|| Error::Malformed("eth_getTransactionCount did not return a string".to_string()))?;
        ethereal_primitives::hex::decode_u64_quantity(hex)
    }

    async fn build_transaction(&self, request: &TransactionRequest, chain_id: u64, nonce: u64) -> Result<Transaction> {
        let from = self.address()?;
        let call_request = CallRequest {
            from: Some(from),
            to: request.to,
            value: Some(request.value),
            data: Some(request.data.clone()),
            access_list: Some(request.access_list.clone()),
            ..Default::default()
        };

        let gas_limit = match request.gas_limit {
            Some(limit) => limit,
            None => {
                let estimate = self.reader.estimate_gas(&call_request).await.map_err(classify_revert)?;
                apply_gas_buffer(estimate, self.gas_buffer_pct)
            }
        };

        let latest = self.reader.latest_block().await?;
        let Some(base_fee) = latest.base_fee_per_gas else {
            return self.build_legacy(request, nonce, gas_limit).await;
        };

        let (computed_max_fee, computed_priority) =
            suggest_fees(base_fee, self.default_priority_fee, self.default_priority_fee);
        let max_priority = request.max_priority_fee_per_gas.unwrap_or(computed_priority);
        let max_fee = request.max_fee_per_gas.unwrap_or(computed_max_fee);

        Ok(Transaction::Eip1559(Eip1559Tx {
            chain_id,
            nonce,
            max_priority_fee_per_gas: max_priority,
            max_fee_per_gas: max_fee,
            gas_limit,
            to: request.to,
            value: request.value,
            data: request.data.clone(),
            access_list: request.access_list.clone(),
        }))
    }

    /// Pre-London fallback: no base fee in the latest block, so build a
    /// legacy envelope using `eth_gasPrice` instead.
    async fn build_legacy(
        &self,
        request: &TransactionRequest,
        nonce: u64,
        gas_limit: u64,
    ) -> Result<Transaction> {
        let gas_price = self.reader.gas_price().await?;
        Ok(Transaction::Legacy(LegacyTx {
            nonce,
            gas_price,
            gas_limit,
            to: request.to,
            value: request.value,
            data: request.data.clone(),
        }))
    }
}
