//! In-memory collaborators for crawler tests

use crate::api::{
    CalendarApi, ExistenceProbe, ExploreApi, ListingApi, Pagination, ReviewsApi, SearchPage,
};
use crate::calendar::{Calendar, CalendarFetch, DateRange, PricingDoc, RateQuote};
use crate::listing::{Geography, Listing, Review};
use crate::state::SectionCache;
use crate::storage::{ListingStore, StorageResult};
use crate::url::{Endpoints, SearchParams};
use crate::{ApiError, ApiResult};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use url::Url;

/// Builds a search page whose listing ids sit under a top-level `ids` array
pub fn search_page(ids: &[&str], has_next_page: bool, items_offset: u32, city: Option<&str>) -> SearchPage {
    let mut data = json!({ "ids": ids });
    if let Some(city) = city {
        data["data"] = json!({"dora": {"exploreV3": {"metadata": {"geography": {"city": city}}}}});
    }
    SearchPage {
        data,
        pagination: Pagination {
            has_next_page,
            items_offset,
        },
    }
}

pub fn pricing_doc(listing_id: &str) -> PricingDoc {
    let checkin = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
    let quote = RateQuote {
        checkin,
        checkout: checkin + chrono::Duration::days(2),
        nights: 2,
        total: 180.0,
        nightly: Vec::new(),
    };
    PricingDoc::from_quotes(listing_id, "USD", vec![quote], Utc::now()).unwrap()
}

/// Serves a fixed sequence of search pages and records every call
pub struct FakeSearch {
    endpoints: Endpoints,
    pages: Mutex<VecDeque<SearchPage>>,
    urls: Mutex<Vec<Url>>,
    details: Mutex<Vec<String>>,
    reviews: Mutex<Vec<String>>,
    cities: Mutex<Vec<String>>,
}

impl FakeSearch {
    pub fn new(pages: Vec<SearchPage>) -> Self {
        Self {
            endpoints: Endpoints::new("https://marketplace.test", "en", "USD").unwrap(),
            pages: Mutex::new(pages.into()),
            urls: Mutex::new(Vec::new()),
            details: Mutex::new(Vec::new()),
            reviews: Mutex::new(Vec::new()),
            cities: Mutex::new(Vec::new()),
        }
    }

    pub fn search_urls(&self) -> Vec<Url> {
        self.urls.lock().unwrap().clone()
    }

    pub fn detail_calls(&self) -> Vec<String> {
        self.details.lock().unwrap().clone()
    }

    pub fn review_calls(&self) -> Vec<String> {
        self.reviews.lock().unwrap().clone()
    }

    /// City of the geography passed to each listing lookup
    pub fn geography_cities(&self) -> Vec<String> {
        self.cities.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExploreApi for FakeSearch {
    fn search_url(&self, query: &str, params: &SearchParams) -> Url {
        self.endpoints.explore_url(query, params, 50)
    }

    async fn search(&self, url: &Url) -> ApiResult<SearchPage> {
        self.urls.lock().unwrap().push(url.clone());
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ApiError::Status {
                url: url.to_string(),
                status: 500,
            })
    }
}

#[async_trait]
impl ListingApi for FakeSearch {
    fn collect_listing_ids(&self, data: &Value, cache: &mut SectionCache) -> ApiResult<Vec<String>> {
        let ids: Vec<String> = data["ids"]
            .as_array()
            .map(|ids| ids.iter().filter_map(|id| id.as_str().map(String::from)).collect())
            .unwrap_or_default();
        for id in &ids {
            cache.insert(id.clone(), json!({"listing": {"id": id}}));
        }
        Ok(ids)
    }

    async fn get_listing(
        &self,
        listing_id: &str,
        cache: &SectionCache,
        geography: &Geography,
        reviews: Vec<Review>,
    ) -> ApiResult<Listing> {
        assert!(cache.contains_key(listing_id));
        self.details.lock().unwrap().push(listing_id.to_string());
        self.cities
            .lock()
            .unwrap()
            .push(geography.get_str("city").unwrap_or_default().to_string());

        let mut listing = Listing::new(listing_id, &format!("https://marketplace.test/rooms/{}", listing_id), Utc::now());
        listing.city = geography.get_str("city").map(String::from);
        listing.reviews = reviews;
        Ok(listing)
    }
}

#[async_trait]
impl ReviewsApi for FakeSearch {
    async fn get_reviews(&self, listing_id: &str) -> ApiResult<Vec<Review>> {
        self.reviews.lock().unwrap().push(listing_id.to_string());
        Ok(Vec::new())
    }
}

/// Canned calendar response for one listing
#[derive(Debug, Clone)]
pub enum CalendarReply {
    Fetched(CalendarFetch),
    Forbidden,
    Status(u16),
}

/// Arguments of one rate data request
#[derive(Debug, Clone)]
pub struct RateCall {
    pub listing_id: String,
    pub ranges: Vec<DateRange>,
    pub detailed: bool,
}

/// Serves canned calendars, pricing and probe statuses, recording every call
#[derive(Default)]
pub struct FakeCalendar {
    replies: HashMap<String, CalendarReply>,
    prices: HashMap<String, PricingDoc>,
    probes: HashMap<String, u16>,
    calendar_calls: Mutex<Vec<String>>,
    rate_calls: Mutex<Vec<RateCall>>,
    probe_calls: Mutex<Vec<String>>,
}

impl FakeCalendar {
    pub fn reply(&mut self, listing_id: &str, reply: CalendarReply) {
        self.replies.insert(listing_id.to_string(), reply);
    }

    pub fn price(&mut self, listing_id: &str, pricing: PricingDoc) {
        self.prices.insert(listing_id.to_string(), pricing);
    }

    pub fn probe(&mut self, listing_id: &str, status: u16) {
        self.probes.insert(listing_id.to_string(), status);
    }

    pub fn calendar_calls(&self) -> Vec<String> {
        self.calendar_calls.lock().unwrap().clone()
    }

    pub fn rate_calls(&self) -> Vec<RateCall> {
        self.rate_calls.lock().unwrap().clone()
    }

    pub fn probe_calls(&self) -> Vec<String> {
        self.probe_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CalendarApi for FakeCalendar {
    async fn get_calendar(&self, listing_id: &str) -> ApiResult<CalendarFetch> {
        self.calendar_calls.lock().unwrap().push(listing_id.to_string());
        let url = format!("https://marketplace.test/calendar/{}", listing_id);

        match self.replies.get(listing_id) {
            Some(CalendarReply::Fetched(fetch)) => Ok(fetch.clone()),
            Some(CalendarReply::Forbidden) => Err(ApiError::Forbidden { url }),
            Some(CalendarReply::Status(status)) => Err(ApiError::Status {
                url,
                status: *status,
            }),
            None => Err(ApiError::Status { url, status: 404 }),
        }
    }

    async fn get_rate_data(
        &self,
        listing_id: &str,
        ranges: &[DateRange],
        _min_nights: u32,
        _max_nights: u32,
        detailed: bool,
    ) -> ApiResult<Option<PricingDoc>> {
        self.rate_calls.lock().unwrap().push(RateCall {
            listing_id: listing_id.to_string(),
            ranges: ranges.to_vec(),
            detailed,
        });
        Ok(self.prices.get(listing_id).cloned())
    }
}

#[async_trait]
impl ExistenceProbe for FakeCalendar {
    async fn probe_listing(&self, listing_id: &str) -> ApiResult<u16> {
        self.probe_calls.lock().unwrap().push(listing_id.to_string());
        Ok(self.probes.get(listing_id).copied().unwrap_or(500))
    }
}

/// Records every write instead of persisting it
#[derive(Debug, Default)]
pub struct RecordingStore {
    pub index: Vec<String>,
    pub saves: Vec<(String, Vec<String>)>,
    pub calendars: Vec<(String, Calendar)>,
    pub pricing: Vec<(String, PricingDoc, u32, u32)>,
    pub deleted: Vec<String>,
}

impl RecordingStore {
    pub fn with_index(ids: &[&str]) -> Self {
        Self {
            index: ids.iter().map(|id| id.to_string()).collect(),
            ..Self::default()
        }
    }
}

impl ListingStore for RecordingStore {
    fn save(&mut self, query: &str, listings: &[Listing]) -> StorageResult<()> {
        let ids = listings.iter().map(|l| l.id.clone()).collect();
        self.saves.push((query.to_string(), ids));
        Ok(())
    }

    fn update_calendar(&mut self, listing_id: &str, calendar: &Calendar) -> StorageResult<()> {
        self.calendars.push((listing_id.to_string(), calendar.clone()));
        Ok(())
    }

    fn update_pricing(
        &mut self,
        listing_id: &str,
        pricing: &PricingDoc,
        min_nights: u32,
        max_nights: u32,
    ) -> StorageResult<()> {
        self.pricing
            .push((listing_id.to_string(), pricing.clone(), min_nights, max_nights));
        Ok(())
    }

    fn mark_deleted(&mut self, listing_id: &str) -> StorageResult<()> {
        self.deleted.push(listing_id.to_string());
        Ok(())
    }

    fn get_all_index_ids(&self) -> StorageResult<Vec<String>> {
        Ok(self.index.clone())
    }
}
