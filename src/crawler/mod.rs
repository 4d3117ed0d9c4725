//! Crawler module for search and calendar harvesting
//!
//! This module contains the core harvesting logic, including:
//! - Paginated search with listing deduplication
//! - Calendar normalization and pricing refresh
//! - Delisting detection for forbidden calendars
//! - Run bookkeeping around both orchestrators

mod calendar;
#[cfg(test)]
mod fakes;
mod search;

pub use calendar::{
    CalendarRefresher, ListingRates, RefreshOutcome, RefreshReport, RefreshSource,
    RefreshSummary, INDEX_SOURCE,
};
pub use search::{CrawlReport, SearchCrawler};

use crate::api::MarketplaceClient;
use crate::calendar::{BookingThresholds, CalendarNormalizer};
use crate::config::Config;
use crate::storage::{RunKind, SqliteStorage};
use crate::url::SearchParams;
use crate::HarvestError;
use std::path::Path;

/// Runs a complete search crawl
///
/// This is the main entry point for the `search` command. It will:
/// 1. Open the storage database
/// 2. Build the marketplace client
/// 3. Record a new search run
/// 4. Crawl every search page and save the listings found
/// 5. Complete or fail the run record
///
/// # Arguments
///
/// * `config` - The harvester configuration
/// * `config_hash` - Hash of the configuration file, stored with the run
/// * `query` - Free-text search query
/// * `params` - Narrowing parameters for the first search request
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed successfully
/// * `Err(HarvestError)` - Crawl failed
pub async fn run_search(
    config: &Config,
    config_hash: &str,
    query: &str,
    params: SearchParams,
) -> Result<CrawlReport, HarvestError> {
    let mut storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
    let client = MarketplaceClient::new(config)?;

    let run_id = storage.create_run(RunKind::Search, config_hash)?;
    tracing::info!("Starting search run {}", run_id);

    let result = SearchCrawler::new(&client, &mut storage)
        .run(query, params)
        .await;

    match result {
        Ok(report) => {
            storage.complete_run(run_id, report.new_listings as u64)?;
            Ok(report)
        }
        Err(e) => {
            tracing::error!("Search run {} failed: {}", run_id, e);
            storage.fail_run(run_id, &e.to_string())?;
            Err(e)
        }
    }
}

/// Runs a calendar refresh
///
/// `source` is either `index` (refresh and persist every active listing) or
/// a single listing id (compute its rate report without persisting).
///
/// # Arguments
///
/// * `config` - The harvester configuration
/// * `config_hash` - Hash of the configuration file, stored with the run
/// * `source` - Source token selecting bulk or single mode
///
/// # Returns
///
/// * `Ok(RefreshReport)` - Refresh completed successfully
/// * `Err(HarvestError)` - Refresh aborted
pub async fn run_calendar(
    config: &Config,
    config_hash: &str,
    source: &str,
) -> Result<RefreshReport, HarvestError> {
    let source = RefreshSource::parse(source);
    let mut storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
    let client = MarketplaceClient::new(config)?;
    let normalizer = CalendarNormalizer::new(BookingThresholds::from(&config.calendar));

    let run_id = storage.create_run(RunKind::Calendar, config_hash)?;
    tracing::info!("Starting calendar run {} for {}", run_id, source);

    let result = CalendarRefresher::new(&client, &mut storage, normalizer)
        .run(&source)
        .await;

    match result {
        Ok(report) => {
            let items = match &report {
                RefreshReport::Index(summary) => summary.total() as u64,
                RefreshReport::Listing(_) => 1,
            };
            storage.complete_run(run_id, items)?;
            Ok(report)
        }
        Err(e) => {
            tracing::error!("Calendar run {} failed: {}", run_id, e);
            storage.fail_run(run_id, &e.to_string())?;
            Err(e)
        }
    }
}
