//! Search crawler - paginated search with listing deduplication
//!
//! Walks the marketplace's search pages for one query, fetching reviews and
//! full details for every listing the first time it is seen, and persists the
//! collected listings in one write at the end of the run.

use crate::api::{ExploreApi, ListingApi, ReviewsApi};
use crate::listing::Listing;
use crate::state::CrawlContext;
use crate::storage::ListingStore;
use crate::url::{carry_forward_params, SearchParams};
use crate::HarvestError;

/// Summary of one search crawl
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// Search pages fetched, including the terminal page
    pub pages: usize,

    /// Listings fetched and saved
    pub new_listings: usize,

    /// Listing ids skipped because an earlier page already returned them
    pub duplicates: usize,
}

/// Drives one search crawl
///
/// A crawler owns its run's `CrawlContext`; create a new crawler for every run.
pub struct SearchCrawler<'a, C, S> {
    client: &'a C,
    store: &'a mut S,
    context: CrawlContext,
}

impl<'a, C, S> SearchCrawler<'a, C, S>
where
    C: ExploreApi + ListingApi + ReviewsApi,
    S: ListingStore,
{
    pub fn new(client: &'a C, store: &'a mut S) -> Self {
        Self {
            client,
            store,
            context: CrawlContext::new(),
        }
    }

    pub fn context(&self) -> &CrawlContext {
        &self.context
    }

    /// Crawls every search page for `query` and saves the listings found
    ///
    /// The listings of a page are processed only while the server reports a
    /// further page; the page reporting no next page ends the crawl. Any
    /// fetch or storage error aborts the crawl before anything is saved.
    ///
    /// # Arguments
    ///
    /// * `query` - Free-text search query (city, region, ...)
    /// * `params` - Narrowing parameters for the first request
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - Page, listing and duplicate counts
    /// * `Err(HarvestError)` - A fetch, decode or storage step failed
    pub async fn run(&mut self, query: &str, params: SearchParams) -> Result<CrawlReport, HarvestError> {
        tracing::info!("Searching for {:?}", query);

        let mut params = params;
        let mut url = self.client.search_url(query, &params);
        let mut page = self.client.search(&url).await?;
        let mut report = CrawlReport {
            pages: 1,
            ..CrawlReport::default()
        };

        if self.context.capture_geography(page.geography()) {
            tracing::debug!("Captured search area geography");
        }
        let geography = self.context.geography();

        let mut listings: Vec<Listing> = Vec::new();

        while page.pagination.has_next_page {
            let listing_ids = self
                .client
                .collect_listing_ids(&page.data, &mut self.context.section_cache)?;

            for listing_id in listing_ids {
                if !self.context.mark_seen(&listing_id) {
                    tracing::warn!("{}: duplicate listing", listing_id);
                    report.duplicates += 1;
                    continue;
                }

                let reviews = self.client.get_reviews(&listing_id).await?;
                let listing = self
                    .client
                    .get_listing(&listing_id, &self.context.section_cache, &geography, reviews)
                    .await?;
                listings.push(listing);
            }

            carry_forward_params(&mut params, &url)?;
            params.items_offset = Some(page.pagination.items_offset);

            url = self.client.search_url(query, &params);
            page = self.client.search(&url).await?;
            report.pages += 1;

            tracing::info!(
                "Fetched page {} for {:?}: {} listings so far",
                report.pages,
                query,
                listings.len()
            );
        }

        report.new_listings = listings.len();
        self.store.save(query, &listings)?;

        tracing::info!(
            "Saved {} listings for {:?} ({} duplicates, {} pages)",
            report.new_listings,
            query,
            report.duplicates,
            report.pages
        );

        Ok(report)
    }
}
