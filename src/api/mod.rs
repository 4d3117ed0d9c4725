//! Marketplace API module
//!
//! This module defines the collaborator traits the crawl loops depend on and
//! the reqwest-backed client that implements them against the marketplace's
//! internal API:
//! - Explore search and search URL construction
//! - Listing section extraction and listing detail lookup
//! - Reviews
//! - Booking calendar and rate data
//! - Listing existence probe

mod client;
pub(crate) mod payload;

pub use client::{build_http_client, MarketplaceClient};

use crate::calendar::{CalendarFetch, DateRange, PricingDoc};
use crate::listing::{Geography, Listing, Review};
use crate::state::SectionCache;
use crate::url::SearchParams;
use crate::ApiResult;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

/// Server-provided pagination state of a search response
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default)]
    pub has_next_page: bool,

    /// Offset to request for the next page
    #[serde(default)]
    pub items_offset: u32,
}

/// One page of explore search results
#[derive(Debug, Clone)]
pub struct SearchPage {
    /// Raw response document
    pub data: Value,
    pub pagination: Pagination,
}

impl SearchPage {
    /// Geography metadata of the searched area, if the response carries any
    pub fn geography(&self) -> Option<Geography> {
        payload::parse_geography(&self.data)
    }
}

/// Outcome of probing a listing's public page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Existence {
    /// HTTP 200: the listing still resolves
    Exists,

    /// HTTP 410: the listing has been removed from the marketplace
    Gone,
}

impl Existence {
    /// Classifies a probe status code; None for any status other than 200 or 410
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            200 => Some(Self::Exists),
            410 => Some(Self::Gone),
            _ => None,
        }
    }
}

/// Explore search: URL construction and page fetches
#[async_trait]
pub trait ExploreApi: Send + Sync {
    /// Builds the search URL for a query and its narrowing parameters
    fn search_url(&self, query: &str, params: &SearchParams) -> Url;

    /// Fetches one page of search results
    async fn search(&self, url: &Url) -> ApiResult<SearchPage>;
}

/// Listing extraction from search pages and full listing lookups
#[async_trait]
pub trait ListingApi: Send + Sync {
    /// Reads the listing ids of a search page in page order, caching each search item
    fn collect_listing_ids(&self, data: &Value, cache: &mut SectionCache) -> ApiResult<Vec<String>>;

    /// Fetches the full listing record
    async fn get_listing(
        &self,
        listing_id: &str,
        cache: &SectionCache,
        geography: &Geography,
        reviews: Vec<Review>,
    ) -> ApiResult<Listing>;
}

/// Guest reviews
#[async_trait]
pub trait ReviewsApi: Send + Sync {
    async fn get_reviews(&self, listing_id: &str) -> ApiResult<Vec<Review>>;
}

/// Booking calendar and pricing
#[async_trait]
pub trait CalendarApi: Send + Sync {
    /// Fetches the raw calendar with the listing's min/max nights
    ///
    /// Fails with `ApiError::Forbidden` when the marketplace denies access.
    async fn get_calendar(&self, listing_id: &str) -> ApiResult<CalendarFetch>;

    /// Fetches rate data for the given available ranges
    ///
    /// Returns None when no pricing could be obtained. With `detailed` set,
    /// quotes carry their per-night breakdown.
    async fn get_rate_data(
        &self,
        listing_id: &str,
        ranges: &[DateRange],
        min_nights: u32,
        max_nights: u32,
        detailed: bool,
    ) -> ApiResult<Option<PricingDoc>>;
}

/// Direct probe of a listing's public page
#[async_trait]
pub trait ExistenceProbe: Send + Sync {
    /// Returns the HTTP status code of the listing's page
    async fn probe_listing(&self, listing_id: &str) -> ApiResult<u16>;
}
