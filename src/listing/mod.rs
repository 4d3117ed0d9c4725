//! Listing records
//!
//! Normalized listing and review records as they are persisted. These are
//! assembled by the marketplace client from search-result items, listing
//! detail payloads, reviews, and the search area's geography.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Geography metadata of a search area (city, state, country, ...)
///
/// Captured once from the first search response of a crawl run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Geography(pub Map<String, Value>);

impl Geography {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a string field of the geography mapping
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }
}

/// A single guest review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub author: Option<String>,
    pub comments: String,
    pub rating: Option<u8>,
    pub language: Option<String>,
    pub created_at: Option<String>,
}

/// A fully assembled listing record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub url: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub room_type: Option<String>,
    pub person_capacity: Option<u32>,
    pub bedrooms: Option<f64>,
    pub beds: Option<u32>,
    pub bathrooms: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub city: Option<String>,
    pub neighborhood: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub host_id: Option<String>,
    pub is_superhost: Option<bool>,
    pub star_rating: Option<f64>,
    pub review_count: Option<u32>,

    /// Price shown on the search results page
    pub price_rate: Option<f64>,
    pub price_rate_type: Option<String>,
    pub currency: Option<String>,

    pub amenities: Vec<String>,
    pub reviews: Vec<Review>,
    pub scraped_at: DateTime<Utc>,
}

impl Listing {
    /// Creates a listing carrying only its identity and scrape time
    pub fn new(id: &str, url: &str, scraped_at: DateTime<Utc>) -> Self {
        Self {
            id: id.to_string(),
            url: url.to_string(),
            name: None,
            description: None,
            room_type: None,
            person_capacity: None,
            bedrooms: None,
            beds: None,
            bathrooms: None,
            latitude: None,
            longitude: None,
            city: None,
            neighborhood: None,
            state: None,
            country: None,
            host_id: None,
            is_superhost: None,
            star_rating: None,
            review_count: None,
            price_rate: None,
            price_rate_type: None,
            currency: None,
            amenities: Vec::new(),
            reviews: Vec::new(),
            scraped_at,
        }
    }
}
