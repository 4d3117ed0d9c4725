//! Storage traits and error types
//!
//! This module defines the persistence interface the crawl loops write
//! through and the associated error types.

use crate::calendar::{Calendar, PricingDoc};
use crate::listing::Listing;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Listing not found: {0}")]
    ListingNotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Persistence sink for harvested listings
///
/// Every method is a single transactional write or read; callers never see
/// partially applied updates.
pub trait ListingStore {
    /// Persists the listings found by one search crawl
    ///
    /// Existing listings are updated in place and reactivated. An empty
    /// `listings` slice is valid and writes nothing.
    ///
    /// # Arguments
    ///
    /// * `query` - The search query that produced the listings
    /// * `listings` - Listings in discovery order
    fn save(&mut self, query: &str, listings: &[Listing]) -> StorageResult<()>;

    /// Replaces the stored calendar of a listing
    fn update_calendar(&mut self, listing_id: &str, calendar: &Calendar) -> StorageResult<()>;

    /// Stores pricing and stay limits of a listing
    fn update_pricing(
        &mut self,
        listing_id: &str,
        pricing: &PricingDoc,
        min_nights: u32,
        max_nights: u32,
    ) -> StorageResult<()>;

    /// Flags a listing as removed from the marketplace
    ///
    /// Fails with `StorageError::ListingNotFound` if the listing is unknown.
    fn mark_deleted(&mut self, listing_id: &str) -> StorageResult<()>;

    /// Returns the ids of all active listings, ordered by id
    fn get_all_index_ids(&self) -> StorageResult<Vec<String>>;
}
