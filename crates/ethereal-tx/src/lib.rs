//! # Transaction model and signing (C4, C6)
//!
//! Legacy, EIP-2930 (access-list), EIP-1559 (fee-market), and EIP-4844
//! (blob) transaction envelopes: preimage assembly, RFC 6979 signing via
//! [`ethereal_crypto`], and the signed RLP envelope.

mod access_list;
mod transaction;

pub use access_list::{AccessList, AccessListEntry};
pub use transaction::{AccessListTx, Eip1559Tx, Eip4844Tx, LegacyTx, Transaction};
