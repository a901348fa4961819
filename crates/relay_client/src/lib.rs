//! Relay client for reading MEV relay data APIs
//!
//! This crate handles communication with a single relay: the HTTP transport,
//! the data API operations built on it and the hooks used to observe them.

pub mod client;
pub mod monitor;
pub mod operations;
pub mod traits;

pub use client::*;
pub use monitor::*;
pub use operations::{DELIVERED_BID_TRACE, QUEUED_PROPOSERS, RECEIVED_BID_TRACES};
pub use traits::*;
