//! Ranking Engine
//!
//! Orders a result set by price ascending, then bedroom count descending.

use std::cmp::Reverse;

use crate::listing::Listing;

/// Rank listings: cheapest first, more bedrooms first at equal price
///
/// The sort is stable, so listings with equal price and bedrooms keep
/// their input order.
pub fn rank(mut results: Vec<Listing>) -> Vec<Listing> {
    results.sort_by_key(|listing| (listing.price, Reverse(listing.bedrooms)));
    results
}
