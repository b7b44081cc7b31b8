//! Error types for the housing pipeline
//!
//! Provides a unified error type for all tiers.

use thiserror::Error;

/// Result type alias using HousingError
pub type Result<T> = std::result::Result<T, HousingError>;

/// Unified error type for housing pipeline operations
#[derive(Debug, Error)]
pub enum HousingError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Data Source Errors
    // -------------------------------------------------------------------------
    /// Listing source missing or corrupt. Fatal at data server startup.
    #[error("Data source error: {0}")]
    DataSource(String),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    /// Malformed or unrecognized request text
    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Backend Errors
    // -------------------------------------------------------------------------
    /// The data server could not be reached (refused, unreachable, timed out)
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The data server answered with an `ERROR` line
    #[error("Backend error: {0}")]
    Backend(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl HousingError {
    /// True for I/O errors that mean the peer went away
    pub fn is_disconnect(&self) -> bool {
        match self {
            HousingError::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::UnexpectedEof
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::BrokenPipe
            ),
            _ => false,
        }
    }

    /// True for I/O errors raised by an expired socket timeout
    ///
    /// Unix reports `WouldBlock`, Windows reports `TimedOut`.
    pub fn is_timeout(&self) -> bool {
        match self {
            HousingError::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
            ),
            _ => false,
        }
    }
}
