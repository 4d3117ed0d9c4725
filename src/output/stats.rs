//! Statistics generation from the harvest database
//!
//! This module provides functionality for extracting and displaying
//! harvest statistics from the storage layer.

use crate::state::ListingState;
use crate::storage::{RunRecord, SqliteStorage};
use crate::HarvestError;
use std::collections::HashMap;

/// Harvest statistics summary
#[derive(Debug, Clone)]
pub struct ListingStatistics {
    /// Total number of stored listings, whatever their state
    pub total_listings: u64,

    /// Count of listings by lifecycle state
    pub listings_by_state: HashMap<ListingState, u64>,

    /// Number of distinct search queries that produced listings
    pub queries: u64,

    /// Stored calendar days across all listings
    pub calendar_days: u64,

    /// Stored calendar days that are booked
    pub booked_days: u64,

    /// Listings with a stored pricing document
    pub priced_listings: u64,

    pub reviews: u64,

    /// Most recent run, if any
    pub latest_run: Option<RunRecord>,
}

impl ListingStatistics {
    pub fn count(&self, state: ListingState) -> u64 {
        self.listings_by_state.get(&state).copied().unwrap_or(0)
    }
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(ListingStatistics)` - Successfully loaded statistics
/// * `Err(HarvestError)` - Failed to query statistics
pub fn load_statistics(storage: &SqliteStorage) -> Result<ListingStatistics, HarvestError> {
    let listings_by_state = storage.count_listings_by_state()?;
    let total_listings = listings_by_state.values().sum();

    Ok(ListingStatistics {
        total_listings,
        listings_by_state,
        queries: storage.count_queries()?,
        calendar_days: storage.count_calendar_days()?,
        booked_days: storage.count_booked_days()?,
        priced_listings: storage.count_priced_listings()?,
        reviews: storage.count_reviews()?,
        latest_run: storage.get_latest_run()?,
    })
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &ListingStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Overview:");
    println!("  Total listings: {}", stats.total_listings);
    println!("  Search queries: {}", stats.queries);
    println!("  Reviews: {}", stats.reviews);
    println!();

    println!("Listings by State:");
    for state in ListingState::all_states() {
        let count = stats.count(state);
        let percentage = if stats.total_listings > 0 {
            (count as f64 / stats.total_listings as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", state, count, percentage);
    }
    println!();

    println!("Calendars:");
    println!("  Calendar days: {}", stats.calendar_days);
    let occupancy = if stats.calendar_days > 0 {
        (stats.booked_days as f64 / stats.calendar_days as f64) * 100.0
    } else {
        0.0
    };
    println!("  Booked days: {} ({:.1}%)", stats.booked_days, occupancy);
    println!("  Listings with pricing: {}", stats.priced_listings);
    println!();

    match &stats.latest_run {
        Some(run) => {
            println!("Latest Run:");
            println!("  #{} {} ({})", run.id, run.kind, run.status);
            println!("  Started: {}", run.started_at);
            if let Some(finished) = &run.finished_at {
                println!("  Finished: {}", finished);
            }
            println!("  Items: {}", run.items);
            if let Some(message) = &run.error_message {
                println!("  Error: {}", message);
            }
        }
        None => println!("No runs recorded yet"),
    }
}
