//! URL handling module for Rental-Harvest
//!
//! This module builds the marketplace API endpoint URLs and decodes the
//! search filters that must be carried from one search page to the next.

mod endpoint;
mod query;

use chrono::NaiveDate;

pub use endpoint::Endpoints;
pub use query::{carry_forward_params, read_variables};

/// Search-narrowing parameters for an explore search
///
/// Dates and prices travel inside the JSON-encoded `variables` query
/// parameter; the bounding box and pagination offset are plain query
/// parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchParams {
    pub checkin: Option<NaiveDate>,
    pub checkout: Option<NaiveDate>,
    pub price_min: Option<u32>,
    pub price_max: Option<u32>,
    pub adults: Option<u32>,

    /// North-east corner of the map bounding box
    pub ne_lat: Option<f64>,
    pub ne_lng: Option<f64>,

    /// South-west corner of the map bounding box
    pub sw_lat: Option<f64>,
    pub sw_lng: Option<f64>,

    /// Offset of the first item of the requested page
    pub items_offset: Option<u32>,
}
