use crate::listing::Geography;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// Search-result items keyed by listing id, filled while reading search pages
pub type SectionCache = HashMap<String, Value>;

/// Per-run crawl state
///
/// One instance belongs to exactly one crawl run. Concurrent runs must each
/// use their own context.
#[derive(Debug, Default)]
pub struct CrawlContext {
    /// Listing ids already emitted during this run; only ever grows
    seen: HashSet<String>,

    /// Geography of the search area, captured from the first search page
    geography: Option<Geography>,

    /// Search-result items read so far, consumed by listing detail lookups
    pub section_cache: SectionCache,
}

impl CrawlContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a listing id as seen
    ///
    /// Returns true if the id is new to this run, false for a duplicate.
    pub fn mark_seen(&mut self, listing_id: &str) -> bool {
        if self.seen.contains(listing_id) {
            return false;
        }
        self.seen.insert(listing_id.to_string());
        true
    }

    pub fn has_seen(&self, listing_id: &str) -> bool {
        self.seen.contains(listing_id)
    }

    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    /// Stores the search area's geography unless one was already captured
    ///
    /// Returns true if the geography was captured by this call.
    pub fn capture_geography(&mut self, geography: Option<Geography>) -> bool {
        if self.geography.is_some() {
            return false;
        }
        match geography {
            Some(geography) => {
                self.geography = Some(geography);
                true
            }
            None => false,
        }
    }

    /// The captured geography, or an empty mapping if none was reported
    pub fn geography(&self) -> Geography {
        self.geography.clone().unwrap_or_default()
    }
}
