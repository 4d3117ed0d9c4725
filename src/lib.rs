//! Rental-Harvest: a short-term-rental marketplace harvester
//!
//! This crate crawls a rental marketplace's internal web API, deduplicates the
//! listings it finds across search pages, and keeps booking calendars and
//! pricing up to date for every listing it knows about.

pub mod api;
pub mod calendar;
pub mod config;
pub mod crawler;
pub mod listing;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Rental-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Marketplace API error: {0}")]
    Api(#[from] ApiError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Could not get listing calendar for existing listing {listing_id}")]
    ListingStillExists { listing_id: String },

    #[error("Unhandled response code {status} while probing listing {listing_id}")]
    UnexpectedProbeStatus { listing_id: String, status: u16 },
}

/// Errors raised by the marketplace API collaborators
#[derive(Debug, Error)]
pub enum ApiError {
    /// Access denied; ambiguous between a blocked request and a listing that no longer resolves
    #[error("Forbidden: {url}")]
    Forbidden { url: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Unexpected payload from {url}: {message}")]
    Payload { url: String, message: String },
}

impl ApiError {
    /// Returns true if this is the marketplace's access-denied classification
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden { .. })
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Missing variables parameter in {0}")]
    MissingVariables(String),

    #[error("Invalid variables parameter: {0}")]
    InvalidVariables(String),
}

/// Result type alias for Rental-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for marketplace API operations
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use calendar::{get_date_ranges, Calendar, CalendarDay, CalendarNormalizer, DateRange, RangeStatus};
pub use config::Config;
pub use crawler::{CalendarRefresher, RefreshSource, SearchCrawler};
pub use listing::{Listing, Review};
pub use state::{CrawlContext, ListingState};
