//! Quiz client side of the lookup service.
//!
//! Fetches question banks from a running server over WebSocket.

mod client;

pub use client::{RemoteSource, REPLY_TIMEOUT};
