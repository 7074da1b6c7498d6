//! Wire protocol of the question lookup service.

mod messages;

pub use messages::{ClientMessage, ServerMessage, DEFAULT_PORT};
