//! # Housing
//!
//! A three-tier housing listing search pipeline:
//! - Data server: filters an in-memory listing set
//! - App server: ranks results and caches them by exact command text
//! - Line-oriented text protocol shared by both hops
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Client (housing-cli)                       │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  LIST / SEARCH / QUIT
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                   App Server (Router)                        │
//! │        QueryCache ──hit──► reply                             │
//! │            │ miss                                            │
//! │            ▼                                                 │
//! │        Backend ──► decode ──► rank ──► store ──► reply       │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  RAW_LIST / RAW_SEARCH
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                   Data Server (DataService)                  │
//! │        ListingStore ──► filter ──► encode                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod listing;
pub mod protocol;
pub mod ranking;
pub mod cache;
pub mod backend;
pub mod data;
pub mod router;
pub mod network;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{HousingError, Result};
pub use config::Config;
pub use listing::{Listing, ListingStore};
pub use router::Router;
pub use data::DataService;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of the housing pipeline
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
