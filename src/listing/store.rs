//! Listing store
//!
//! Loads the listings file once and hands out read-only access.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::{HousingError, Result};

use super::Listing;

/// Characters that would break the `key=value;...` record framing
const RESERVED_CHARS: [char; 4] = [';', '=', '\n', '\r'];

/// Immutable collection of listings
///
/// Built once at data server startup and shared behind an `Arc`.
/// There are no mutation operations.
#[derive(Debug, Clone)]
pub struct ListingStore {
    listings: Vec<Listing>,
}

impl ListingStore {
    /// Load listings from a JSON array file
    ///
    /// Any failure here is a `DataSource` error: the data server cannot
    /// serve without data.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| {
            HousingError::DataSource(format!("cannot read {}: {}", path.display(), e))
        })?;

        let listings: Vec<Listing> = serde_json::from_str(&raw).map_err(|e| {
            HousingError::DataSource(format!("malformed listings in {}: {}", path.display(), e))
        })?;

        let store = Self::from_listings(listings)?;
        tracing::info!("Loaded {} listings from {}", store.len(), path.display());
        Ok(store)
    }

    /// Build a store from in-memory listings, applying the same validation as `load`
    pub fn from_listings(listings: Vec<Listing>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(listings.len());

        for listing in &listings {
            if !seen.insert(listing.id) {
                return Err(HousingError::DataSource(format!(
                    "duplicate listing id {}",
                    listing.id
                )));
            }
            if listing.city.trim().is_empty() {
                return Err(HousingError::DataSource(format!(
                    "listing {} has an empty city",
                    listing.id
                )));
            }
            validate_field(listing.id, "city", &listing.city)?;
            validate_field(listing.id, "address", &listing.address)?;
        }

        Ok(Self { listings })
    }

    /// All listings in source order
    pub fn all(&self) -> &[Listing] {
        &self.listings
    }

    /// Number of listings
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    /// True if the store holds no listings
    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}

fn validate_field(id: u64, name: &str, value: &str) -> Result<()> {
    if let Some(c) = value.chars().find(|c| RESERVED_CHARS.contains(c)) {
        return Err(HousingError::DataSource(format!(
            "listing {} field {} contains reserved character {:?}",
            id, name, c
        )));
    }
    Ok(())
}
