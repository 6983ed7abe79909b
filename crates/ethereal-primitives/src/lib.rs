//! # Core primitives
//!
//! This crate holds the leaves of the `ethereal` toolkit: hex/keccak
//! utilities, the value types shared by every other crate (`Address`,
//! `Hash`, `HexData`, `Wei`, `Int256`, `BlockTag`), and the sealed error
//! taxonomy that every fallible operation in the toolkit returns.
//!
//! Nothing here talks to a node; this crate has no async runtime and no
//! networking dependency.

pub mod error;
pub mod hex;
pub mod keccak;
pub mod types;

pub use error::{Error, Result};
pub use types::{Address, BlockTag, HexData, Int256, Wei, B256 as Hash};
