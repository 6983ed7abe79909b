//! Multicall3 batcher: record calls against a recorder binding, then flush
//! them as chunked `aggregate3` batches.

use std::sync::{Arc, Mutex, OnceLock};

use ethereal_abi::{decode_returns, Schema, Value};
use ethereal_client::{CallRequest, Reader};
use ethereal_primitives::error::Error;
use ethereal_primitives::{Address, BlockTag, HexData, Result};

use crate::registry::default_multicall3_address;

/// Entries per `aggregate3` call are capped at this many by default; a
/// caller can lower it with [`Batch::with_chunk_size`] if a target chain's
/// block gas limit can't fit 500 calls in one `eth_call`.
pub const DEFAULT_CHUNK_SIZE: usize = 500;

type Slot = OnceLock<std::result::Result<Vec<Value>, Error>>;

/// A handle to one recorded call's eventual result, resolved once
/// [`Batch::execute`] runs the chunk it belongs to.
#[derive(Clone)]
pub struct Handle {
    slot: Arc<Slot>,
}

impl Handle {
    /// The decoded return values, or the revert/transport error the chunk
    /// failed with. Returns [`Error::Invalidated`] if called before
    /// [`Batch::execute`] — a handle is only meaningful after a flush.
    pub fn get(&self) -> Result<Vec<Value>> {
        match self.slot.get() {
            Some(Ok(values)) => Ok(values.clone()),
            Some(Err(err)) => Err(err.clone()),
            None => Err(Error::Invalidated),
        }
    }

    fn complete(&self, result: std::result::Result<Vec<Value>, Error>) {
        if self.slot.set(result).is_err() {
            tracing::error!("multicall handle completed more than once; ignoring the second completion");
        }
    }
}

struct PendingEntry {
    target: Address,
    calldata: Vec<u8>,
    return_schema: Vec<Schema>,
    allow_failure: bool,
    handle: Handle,
}

/// Records calls against a reader and flushes them as `aggregate3` batches.
pub struct Batch {
    reader: Reader,
    multicall_address: Address,
    chunk_size: usize,
    pending: Mutex<Vec<PendingEntry>>,
}

impl Batch {
    pub fn new(reader: Reader) -> Self {
        Batch {
            reader,
            multicall_address: default_multicall3_address(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn with_multicall_address(mut self, address: Address) -> Self {
        self.multicall_address = address;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Records a call without sending anything. Returns a [`Handle`] whose
    /// value is available only after [`Batch::execute`] runs.
    pub fn record(&self, target: Address, calldata: Vec<u8>, return_schema: Vec<Schema>, allow_failure: bool) -> Handle {
        let handle = Handle {
            slot: Arc::new(OnceLock::new()),
        };
        self.pending.lock().unwrap().push(PendingEntry {
            target,
            calldata,
            return_schema,
            allow_failure,
            handle: handle.clone(),
        });
        handle
    }

    /// Flushes every recorded call, chunked at `chunk_size`. A chunk that
    /// fails at the transport level fails every handle in that chunk with
    /// the same cause — no handle is left incomplete.
    pub async fn execute(&self) -> Result<()> {
        let entries = std::mem::take(&mut *self.pending.lock().unwrap());
        for chunk in entries.chunks(self.chunk_size) {
            match self.call_chunk(chunk).await {
                Ok(results) => {
                    for (entry, (success, return_data)) in chunk.iter().zip(results) {
                        entry.handle.complete(decode_entry_result(entry, success, &return_data));
                    }
                }
                Err(err) => {
                    for entry in chunk {
                        entry.handle.complete(Err(err.clone()));
                    }
                }
            }
        }
        Ok(())
    }

    async fn call_chunk(&self, chunk: &[PendingEntry]) -> Result<Vec<(bool, Vec<u8>)>> {
        let calldata = encode_aggregate3(chunk);
        let request = CallRequest {
            to: Some(self.multicall_address),
            data: Some(HexData::from_bytes(calldata)),
            ..Default::default()
        };
        let result = self.reader.call(&request, BlockTag::LATEST).await?;
        decode_aggregate3_result(result.as_bytes())
    }
}

fn aggregate3_input_schema() -> Schema {
    Schema::array(Schema::Tuple(vec![Schema::Address, Schema::Bool, Schema::DynamicBytes]))
}

fn aggregate3_output_schema() -> Schema {
    Schema::array(Schema::Tuple(vec![Schema::Bool, Schema::DynamicBytes]))
}

fn encode_aggregate3(chunk: &[PendingEntry]) -> Vec<u8> {
    let calls = chunk
        .iter()
        .map(|entry| {
            Value::Tuple(vec![
                Value::Address(entry.target),
                Value::Bool(entry.allow_failure),
                Value::Bytes(entry.calldata.clone()),
            ])
        })
        .collect();
    ethereal_abi::encode_call("aggregate3", &[aggregate3_input_schema()], &[Value::Array(calls)])
        .expect("aggregate3 call shape is always well-typed")
}

fn decode_aggregate3_result(data: &[u8]) -> Result<Vec<(bool, Vec<u8>)>> {
    let decoded = decode_returns(data, &[aggregate3_output_schema()])?;
    let Some(Value::Array(results)) = decoded.into_iter().next() else {
        return Err(Error::AbiDecoding("aggregate3 did not return an array".to_string()));
    };
    results
        .into_iter()
        .map(|result| match result {
            Value::Tuple(mut fields) if fields.len() == 2 => {
                let return_data = fields.pop();
                let success = fields.pop();
                match (success, return_data) {
                    (Some(Value::Bool(success)), Some(Value::Bytes(bytes))) => Ok((success, bytes)),
                    _ => Err(Error::AbiDecoding("malformed aggregate3 result tuple".to_string())),
                }
            }
            _ => Err(Error::AbiDecoding("malformed aggregate3 result tuple".to_string())),
        })
        .collect()
}

fn decode_entry_result(entry: &PendingEntry, success: bool, return_data: &[u8]) -> std::result::Result<Vec<Value>, Error> {
    if success {
        decode_returns(return_data, &entry.return_schema)
    } else {
        Err(Error::Revert(ethereal_abi::decode_revert(return_data)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethereal_transport::{HttpProvider, Provider};

    fn batch() -> Batch {
        Batch::new(Reader::new(Provider::Http(HttpProvider::new("http://localhost:8545").unwrap())))
    }

    #[test]
    fn a_handle_is_invalidated_before_execute_runs() {
        let batch = batch();
        let handle = batch.record(Address::ZERO, vec![0xaa], vec![Schema::uint256()], true);
        assert!(matches!(handle.get().unwrap_err(), Error::Invalidated));
    }

    #[test]
    fn encode_decode_round_trip_for_aggregate3() {
        let calls = vec![Value::Tuple(vec![
            Value::Address(Address::ZERO),
            Value::Bool(true),
            Value::Bytes(vec![0x01, 0x02]),
        ])];
        let encoded = ethereal_abi::encode_call("aggregate3", &[aggregate3_input_schema()], &[Value::Array(calls)]).unwrap();
        assert_eq!(encoded[..4], ethereal_abi::selector("aggregate3", &[aggregate3_input_schema()]));
    }

    #[test]
    fn completing_a_handle_twice_keeps_the_first_result() {
        let handle = Handle {
            slot: Arc::new(OnceLock::new()),
        };
        handle.complete(Ok(vec![Value::Bool(true)]));
        handle.complete(Ok(vec![Value::Bool(false)]));
        assert_eq!(handle.get().unwrap(), vec![Value::Bool(true)]);
    }
}
