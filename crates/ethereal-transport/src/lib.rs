//! # Transports
//!
//! Two ways to reach a node: a plain [`http::HttpProvider`] and a
//! correlated [`websocket::WsProvider`] with request/response matching,
//! subscriptions, and reconnect. [`provider::Provider`] lets
//! `ethereal-client` hold either behind one call surface.

pub mod http;
pub mod jsonrpc;
pub mod provider;
mod slot_table;
pub mod websocket;

pub use http::HttpProvider;
pub use jsonrpc::{Frame, RawResponse};
pub use provider::Provider;
pub use slot_table::SlotTable;
pub use websocket::{Subscription, WsProvider};
