//! Output module for harvest reports
//!
//! This module handles:
//! - Recording and displaying database statistics
//! - Rendering single-listing rate reports as JSON

pub mod stats;

pub use stats::{load_statistics, print_statistics, ListingStatistics};

use crate::crawler::ListingRates;
use crate::HarvestError;

/// Renders a single-listing rate report as pretty-printed JSON
///
/// # Arguments
///
/// * `rates` - Calendar and rate data computed for one listing
///
/// # Returns
///
/// * `Ok(String)` - The JSON document
/// * `Err(HarvestError)` - Serialization failed
pub fn render_listing_rates(rates: &ListingRates) -> Result<String, HarvestError> {
    Ok(serde_json::to_string_pretty(rates)?)
}
