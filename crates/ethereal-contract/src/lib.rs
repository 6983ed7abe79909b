//! # Contract facade + Multicall3 batcher
//!
//! Binds a caller-declared set of [`MethodDescriptor`]s onto an address and
//! dispatches each call over a [`ethereal_client::Reader`] (view) or
//! [`ethereal_client::Signer`] (nonview/payable). [`Batch`] records calls
//! against the Multicall3 contract and flushes them in `aggregate3` chunks.

mod contract;
mod descriptor;
mod multicall;
mod registry;

pub use contract::Contract;
pub use descriptor::{MethodDescriptor, Mutability};
pub use multicall::{Batch, Handle, DEFAULT_CHUNK_SIZE};
pub use registry::{default_multicall3_address, Registry};
