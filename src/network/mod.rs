//! Network Module
//!
//! TCP server and client connection handling, shared by both server tiers.
//!
//! ## Architecture
//! - Single acceptor thread (non-blocking accept, polls the shutdown flag)
//! - One thread per connection, capped by `max_connections`
//! - Each request line is routed through a `Handler`

mod server;
mod connection;

pub use server::{Server, ShutdownHandle};
pub use connection::Connection;

/// Turns one request line into one encoded response
///
/// Implemented by `Router` (app server) and `DataService` (data server).
pub trait Handler: Send + Sync + 'static {
    fn handle(&self, line: &str) -> Reply;
}

/// Response to a single request line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Encoded response text to write back
    pub response: String,

    /// Close the connection after writing the response
    pub close: bool,
}

impl Reply {
    /// Respond and keep the session open
    pub fn respond(response: String) -> Self {
        Self {
            response,
            close: false,
        }
    }

    /// Respond, then end the session
    pub fn close(response: String) -> Self {
        Self {
            response,
            close: true,
        }
    }
}
