//! Question lookup service.
//!
//! Serves exam data over WebSocket so quiz clients need no local copy.

mod server;

pub use server::{run, serve, LookupService};
