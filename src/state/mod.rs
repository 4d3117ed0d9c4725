//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlContext`: per-run state owned by one search crawler (seen listing ids,
//!   geography, search-result cache)
//! - `ListingState`: lifecycle of a stored listing (active or deleted)

mod crawl_context;
mod listing_state;

pub use crawl_context::{CrawlContext, SectionCache};
pub use listing_state::ListingState;
