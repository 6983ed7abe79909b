//! # ethereal
//!
//! An EVM JSON-RPC client toolkit: ABI and RLP codecs, transaction
//! construction and signing, an HTTP/WebSocket JSON-RPC transport, a
//! Reader/Signer facade with a gas strategy and retry policy, and a
//! contract facade with a Multicall3 batcher.
//!
//! This crate is a thin prelude over the toolkit's individual crates —
//! pull in [`ethereal_client`], [`ethereal_contract`], etc. directly if you
//! only need one layer.

pub use ethereal_abi as abi;
pub use ethereal_client as client;
pub use ethereal_contract as contract;
pub use ethereal_crypto as crypto;
pub use ethereal_primitives as primitives;
pub use ethereal_rlp as rlp;
pub use ethereal_transport as transport;
pub use ethereal_tx as tx;

pub use ethereal_primitives::{Address, BlockTag, Error, Hash, HexData, Int256, Result, Wei};
pub use ethereal_crypto::PrivateKey;
pub use ethereal_tx::{AccessList, AccessListEntry, Transaction};
pub use ethereal_transport::{HttpProvider, Provider, WsProvider};
pub use ethereal_client::{Reader, Signer, TransactionRequest};
pub use ethereal_contract::{Batch, Contract, MethodDescriptor, Mutability};
