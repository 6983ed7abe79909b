//! # Reader/Signer facade
//!
//! Chain-id caching, the EIP-1559 gas strategy with legacy fallback,
//! receipt polling with revert replay, and the [`RpcRetry`] wrapper that
//! tells I/O hiccups apart from reverts.

mod gas;
mod reader;
mod request;
mod retry;
mod signer;
mod wire;

pub use gas::{apply_gas_buffer, suggest_fees, DEFAULT_GAS_BUFFER_PCT};
pub use reader::Reader;
pub use request::TransactionRequest;
pub use retry::RpcRetry;
pub use signer::Signer;
pub use wire::{AccessListResult, Block, CallRequest, Log, LogFilter, Receipt, TransactionInfo};
