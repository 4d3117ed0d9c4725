//! Calendar refresh - booking calendars and pricing for known listings
//!
//! Bulk mode walks every active listing in the index, normalizes its calendar,
//! fetches pricing, and persists both. A listing whose calendar is forbidden
//! is probed directly to tell a delisting apart from a blocked request.
//! Single mode computes the same data for one listing without persisting it.

use crate::api::{CalendarApi, ExistenceProbe, Existence};
use crate::calendar::{
    get_date_ranges, Calendar, CalendarFetch, CalendarNormalizer, DateRange, PricingDoc,
    RangeStatus,
};
use crate::storage::ListingStore;
use crate::{ApiError, HarvestError};
use serde::Serialize;
use std::fmt;

/// Source token selecting every listing in the index
pub const INDEX_SOURCE: &str = "index";

/// What a calendar refresh run covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshSource {
    /// Every active listing in the index, results persisted
    Index,

    /// One listing, results returned instead of persisted
    Listing(String),
}

impl RefreshSource {
    /// Parses a source token: `index` selects bulk mode, anything else is a listing id
    pub fn parse(token: &str) -> Self {
        if token == INDEX_SOURCE {
            Self::Index
        } else {
            Self::Listing(token.to_string())
        }
    }
}

impl fmt::Display for RefreshSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index => f.write_str(INDEX_SOURCE),
            Self::Listing(id) => write!(f, "listing {}", id),
        }
    }
}

/// Result of refreshing one listing in bulk mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Calendar and pricing were stored
    Updated,

    /// Calendar was stored; no pricing could be obtained
    CalendarOnly,

    /// The listing is gone from the marketplace and was marked deleted
    Delisted,
}

/// Tally of a bulk refresh
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    pub updated: usize,
    pub calendar_only: usize,
    pub delisted: usize,
}

impl RefreshSummary {
    fn record(&mut self, outcome: RefreshOutcome) {
        match outcome {
            RefreshOutcome::Updated => self.updated += 1,
            RefreshOutcome::CalendarOnly => self.calendar_only += 1,
            RefreshOutcome::Delisted => self.delisted += 1,
        }
    }

    /// Listings visited, whatever their outcome
    pub fn total(&self) -> usize {
        self.updated + self.calendar_only + self.delisted
    }
}

/// Calendar and detailed rate data for a single listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingRates {
    pub listing_id: String,
    pub min_nights: u32,
    pub max_nights: u32,

    /// Normalized calendar
    pub calendar: Calendar,

    /// Booked runs dropped as fabricated
    pub removed: Vec<DateRange>,

    /// Booked runs kept but flagged as suspiciously long
    pub flagged: Vec<DateRange>,

    pub pricing: Option<PricingDoc>,
}

/// What a calendar refresh run produced
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshReport {
    Index(RefreshSummary),
    Listing(ListingRates),
}

/// Drives calendar and pricing refreshes
pub struct CalendarRefresher<'a, C, S> {
    client: &'a C,
    store: &'a mut S,
    normalizer: CalendarNormalizer,
}

impl<'a, C, S> CalendarRefresher<'a, C, S>
where
    C: CalendarApi + ExistenceProbe,
    S: ListingStore,
{
    pub fn new(client: &'a C, store: &'a mut S, normalizer: CalendarNormalizer) -> Self {
        Self {
            client,
            store,
            normalizer,
        }
    }

    /// Runs a refresh for the given source
    pub async fn run(&mut self, source: &RefreshSource) -> Result<RefreshReport, HarvestError> {
        match source {
            RefreshSource::Index => Ok(RefreshReport::Index(self.refresh_index().await?)),
            RefreshSource::Listing(listing_id) => {
                Ok(RefreshReport::Listing(self.listing_rates(listing_id).await?))
            }
        }
    }

    /// Refreshes every active listing in index order
    ///
    /// The first unhandled error aborts the run; listings refreshed before it
    /// keep their stored updates.
    pub async fn refresh_index(&mut self) -> Result<RefreshSummary, HarvestError> {
        let listing_ids = self.store.get_all_index_ids()?;
        tracing::info!("Refreshing calendars for {} listings", listing_ids.len());

        let mut summary = RefreshSummary::default();
        for (i, listing_id) in listing_ids.iter().enumerate() {
            let outcome = self.refresh_listing(listing_id).await?;
            summary.record(outcome);
            tracing::debug!(
                "[{}/{}] {}: {:?}",
                i + 1,
                listing_ids.len(),
                listing_id,
                outcome
            );
        }

        tracing::info!(
            "Calendar refresh complete: {} updated, {} calendar only, {} delisted",
            summary.updated,
            summary.calendar_only,
            summary.delisted
        );

        Ok(summary)
    }

    /// Refreshes and persists one listing's calendar and pricing
    pub async fn refresh_listing(&mut self, listing_id: &str) -> Result<RefreshOutcome, HarvestError> {
        let fetch = match self.client.get_calendar(listing_id).await {
            Ok(fetch) => fetch,
            Err(ApiError::Forbidden { .. }) => return self.resolve_forbidden(listing_id).await,
            Err(e) => return Err(e.into()),
        };
        let CalendarFetch {
            calendar,
            min_nights,
            max_nights,
        } = fetch;

        let normalized = self.normalizer.normalize(listing_id, calendar);
        self.store.update_calendar(listing_id, &normalized.calendar)?;

        let available = get_date_ranges(&normalized.calendar, RangeStatus::Available);
        let pricing = self
            .client
            .get_rate_data(listing_id, &available, min_nights, max_nights, false)
            .await?;

        match pricing {
            Some(pricing) => {
                self.store
                    .update_pricing(listing_id, &pricing, min_nights, max_nights)?;
                Ok(RefreshOutcome::Updated)
            }
            None => {
                tracing::warn!("{}: no pricing data, calendar updated only", listing_id);
                Ok(RefreshOutcome::CalendarOnly)
            }
        }
    }

    /// Computes calendar and detailed rate data for one listing without persisting
    pub async fn listing_rates(&self, listing_id: &str) -> Result<ListingRates, HarvestError> {
        let CalendarFetch {
            calendar,
            min_nights,
            max_nights,
        } = self.client.get_calendar(listing_id).await?;

        let normalized = self.normalizer.normalize(listing_id, calendar);
        let available = get_date_ranges(&normalized.calendar, RangeStatus::Available);
        let pricing = self
            .client
            .get_rate_data(listing_id, &available, min_nights, max_nights, true)
            .await?;

        Ok(ListingRates {
            listing_id: listing_id.to_string(),
            min_nights,
            max_nights,
            calendar: normalized.calendar,
            removed: normalized.removed,
            flagged: normalized.flagged,
            pricing,
        })
    }

    /// Decides what a forbidden calendar response means for a listing
    ///
    /// The listing page is probed: a removed listing (410) is marked deleted,
    /// a listing that still resolves (200) means the calendar was blocked for
    /// another reason, which is fatal, as is any other status.
    async fn resolve_forbidden(&mut self, listing_id: &str) -> Result<RefreshOutcome, HarvestError> {
        let status = self.client.probe_listing(listing_id).await?;

        match Existence::from_status(status) {
            Some(Existence::Gone) => {
                tracing::warn!("{}: listing removed from marketplace", listing_id);
                self.store.mark_deleted(listing_id)?;
                Ok(RefreshOutcome::Delisted)
            }
            Some(Existence::Exists) => Err(HarvestError::ListingStillExists {
                listing_id: listing_id.to_string(),
            }),
            None => Err(HarvestError::UnexpectedProbeStatus {
                listing_id: listing_id.to_string(),
                status,
            }),
        }
    }
}
