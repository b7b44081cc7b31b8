//! Filter engine
//!
//! Applies the city / max price predicate to a listing set.

use super::Listing;

/// Predicate derived from a `SEARCH` command
///
/// An absent field places no constraint on that field. The default
/// filter matches everything (`LIST`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    /// City to match, case-insensitive
    pub city: Option<String>,

    /// Inclusive upper bound on price
    pub max_price: Option<u64>,
}

impl Filter {
    /// Filter with no constraints
    pub fn any() -> Self {
        Self::default()
    }

    /// True if the filter has no constraints
    pub fn is_unconstrained(&self) -> bool {
        self.city.is_none() && self.max_price.is_none()
    }

    /// Test a single listing against the predicate
    pub fn matches(&self, listing: &Listing) -> bool {
        let city_ok = match &self.city {
            Some(city) => listing.city.to_lowercase() == city.to_lowercase(),
            None => true,
        };
        let price_ok = match self.max_price {
            Some(max) => listing.price <= max,
            None => true,
        };
        city_ok && price_ok
    }
}

/// Return the listings matching `predicate`, in input order
///
/// Ranking is a separate downstream step.
pub fn filter(all: &[Listing], predicate: &Filter) -> Vec<Listing> {
    if predicate.is_unconstrained() {
        return all.to_vec();
    }

    all.iter()
        .filter(|listing| predicate.matches(listing))
        .cloned()
        .collect()
}
