//! Response definitions
//!
//! Represents responses sent back to clients by either tier.

use crate::listing::Listing;

/// Error message for malformed or unknown requests
pub const INVALID_COMMAND: &str = "Invalid command";

/// Error message when the data server cannot be reached
pub const BACKEND_UNAVAILABLE: &str = "Cannot connect to Data Server";

/// Error message when the data server reply cannot be decoded
pub const BACKEND_INVALID_RESPONSE: &str = "Invalid response from Data Server";

/// Error message when the connection limit is reached
pub const SERVER_BUSY: &str = "Server busy";

/// A response to send to a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// `OK RESULT <n>` followed by `n` records and `END`
    Results(Vec<Listing>),

    /// Single `ERROR <message>` line
    Error(String),

    /// `OK BYE`, acknowledging `QUIT`
    Bye,
}

impl Response {
    /// Create an ERROR response
    pub fn error(message: &str) -> Self {
        Response::Error(message.to_string())
    }

    /// `ERROR Invalid command`
    pub fn invalid_command() -> Self {
        Self::error(INVALID_COMMAND)
    }

    /// `ERROR Cannot connect to Data Server`
    pub fn backend_unavailable() -> Self {
        Self::error(BACKEND_UNAVAILABLE)
    }
}
