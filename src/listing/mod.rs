//! Listing Module
//!
//! The static listing data served by the data tier.
//!
//! ## Responsibilities
//! - Typed listing records, validated when loaded
//! - Read-only store loaded once at startup
//! - Equality/threshold filtering for `RAW_SEARCH`

mod filter;
mod store;

pub use filter::{filter, Filter};
pub use store::ListingStore;

use serde::{Deserialize, Serialize};

/// A single housing listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    /// Unique identifier
    pub id: u64,

    /// City name (matched case-insensitively)
    pub city: String,

    /// Street address
    pub address: String,

    /// Monthly price
    pub price: u64,

    /// Bedroom count
    pub bedrooms: u32,
}
