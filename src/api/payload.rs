//! Response payload shapes and field extraction
//!
//! Only the fields this crate uses are modeled; everything is optional so a
//! partially filled payload still yields a record.

use crate::api::Pagination;
use crate::calendar::{Calendar, CalendarDay};
use crate::listing::{Geography, Listing, Review};
use crate::state::SectionCache;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::Value;

pub const EXPLORE_ROOT: &str = "/data/dora/exploreV3";
pub const PAGINATION: &str = "/data/dora/exploreV3/metadata/paginationMetadata";
pub const GEOGRAPHY: &str = "/data/dora/exploreV3/metadata/geography";
pub const LISTING_DETAIL: &str = "/data/pdp/listing";
pub const REVIEWS: &str = "/data/pdp/reviews";
pub const AVAILABILITY: &str = "/data/pdp/availabilityCalendar";
pub const BOOKING_QUOTE: &str = "/data/pdp/bookingQuote";

/// Default stay-length bounds when the calendar carries none
pub const DEFAULT_MIN_NIGHTS: u32 = 1;
pub const DEFAULT_MAX_NIGHTS: u32 = 1125;

// ===== Search =====

pub fn parse_pagination(data: &Value) -> Option<Pagination> {
    data.pointer(PAGINATION)
        .and_then(|v| serde_json::from_value(v.clone()).ok())
}

pub fn parse_geography(data: &Value) -> Option<Geography> {
    match data.pointer(GEOGRAPHY) {
        Some(Value::Object(map)) if !map.is_empty() => Some(Geography(map.clone())),
        _ => None,
    }
}

/// Listing ids are numbers on some endpoints and strings on others
pub fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Walks every section of a search page and returns listing ids in page order
///
/// Each item is cached under its listing id. Returns None when the page is
/// not an explore search document.
pub fn collect_section_items(data: &Value, cache: &mut SectionCache) -> Option<Vec<String>> {
    let root = data.pointer(EXPLORE_ROOT)?;
    let mut ids = Vec::new();

    let sections = root.get("sections").and_then(Value::as_array);
    for section in sections.into_iter().flatten() {
        let items = section.get("items").and_then(Value::as_array);
        for item in items.into_iter().flatten() {
            let Some(id) = item.pointer("/listing/id").and_then(id_string) else {
                continue;
            };
            cache.insert(id.clone(), item.clone());
            ids.push(id);
        }
    }

    Some(ids)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchItem {
    #[serde(default)]
    pub listing: SearchListing,
    pub pricing_quote: Option<SearchPricingQuote>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchListing {
    pub name: Option<String>,
    pub room_type_category: Option<String>,
    pub person_capacity: Option<u32>,
    pub avg_rating: Option<f64>,
    pub reviews_count: Option<u32>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub city: Option<String>,
    pub neighborhood: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPricingQuote {
    pub rate: Option<Money>,
    pub rate_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Money {
    pub amount: f64,
    pub currency: Option<String>,
}

// ===== Listing detail =====

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDetail {
    pub name: Option<String>,
    pub description: Option<String>,
    pub room_type: Option<String>,
    pub person_capacity: Option<u32>,
    pub bedrooms: Option<f64>,
    pub beds: Option<u32>,
    pub bathrooms: Option<f64>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub city: Option<String>,
    pub neighborhood: Option<String>,
    pub star_rating: Option<f64>,
    pub reviews_count: Option<u32>,
    #[serde(default)]
    pub amenities: Vec<Amenity>,
    pub host: Option<Host>,
}

#[derive(Debug, Deserialize)]
pub struct Amenity {
    pub title: String,
    #[serde(default = "default_true")]
    pub available: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Host {
    pub id: Option<Value>,
    pub is_superhost: Option<bool>,
}

fn default_true() -> bool {
    true
}

/// Merges a listing detail payload with its cached search item and the search geography
pub fn assemble_listing(
    listing_id: &str,
    url: String,
    detail: ListingDetail,
    item: SearchItem,
    geography: &Geography,
    reviews: Vec<Review>,
    scraped_at: DateTime<Utc>,
) -> Listing {
    let search = item.listing;
    let (price_rate, currency, price_rate_type) = match item.pricing_quote {
        Some(quote) => (
            quote.rate.as_ref().map(|r| r.amount),
            quote.rate.and_then(|r| r.currency),
            quote.rate_type,
        ),
        None => (None, None, None),
    };

    Listing {
        id: listing_id.to_string(),
        url,
        name: detail.name.or(search.name),
        description: detail.description,
        room_type: detail.room_type.or(search.room_type_category),
        person_capacity: detail.person_capacity.or(search.person_capacity),
        bedrooms: detail.bedrooms,
        beds: detail.beds,
        bathrooms: detail.bathrooms,
        latitude: detail.lat.or(search.lat),
        longitude: detail.lng.or(search.lng),
        city: detail
            .city
            .or(search.city)
            .or_else(|| geography.get_str("city").map(str::to_string)),
        neighborhood: detail.neighborhood.or(search.neighborhood),
        state: geography.get_str("state").map(str::to_string),
        country: geography.get_str("country").map(str::to_string),
        host_id: detail.host.as_ref().and_then(|h| h.id.as_ref()).and_then(id_string),
        is_superhost: detail.host.and_then(|h| h.is_superhost),
        star_rating: detail.star_rating.or(search.avg_rating),
        review_count: detail.reviews_count.or(search.reviews_count),
        price_rate,
        price_rate_type,
        currency,
        amenities: detail
            .amenities
            .into_iter()
            .filter(|a| a.available)
            .map(|a| a.title)
            .collect(),
        reviews,
        scraped_at,
    }
}

// ===== Reviews =====

#[derive(Debug, Default, Deserialize)]
pub struct ReviewsPage {
    #[serde(default)]
    pub reviews: Vec<ReviewPayload>,
    #[serde(default)]
    pub metadata: ReviewsMetadata,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewsMetadata {
    pub reviews_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPayload {
    pub id: Value,
    #[serde(default)]
    pub comments: String,
    pub rating: Option<u8>,
    pub language: Option<String>,
    pub created_at: Option<String>,
    pub reviewer: Option<Reviewer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reviewer {
    pub first_name: Option<String>,
}

impl ReviewPayload {
    pub fn into_review(self) -> Review {
        Review {
            id: id_string(&self.id).unwrap_or_default(),
            author: self.reviewer.and_then(|r| r.first_name),
            comments: self.comments,
            rating: self.rating,
            language: self.language,
            created_at: self.created_at,
        }
    }
}

// ===== Calendar =====

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityCalendar {
    #[serde(default)]
    pub calendar_months: Vec<CalendarMonth>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CalendarMonth {
    #[serde(default)]
    pub days: Vec<CalendarDayPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDayPayload {
    pub calendar_date: NaiveDate,
    pub available: bool,
    pub min_nights: Option<u32>,
    pub max_nights: Option<u32>,
    pub price: Option<Money>,
}

impl AvailabilityCalendar {
    /// Flattens the months into one calendar with the listing's stay bounds
    ///
    /// Months may overlap at their edges; a date seen twice keeps its last record.
    pub fn into_calendar(self) -> (Calendar, u32, u32) {
        let mut calendar = Calendar::new();
        let mut min_nights = None;
        let mut max_nights = None;

        for day in self.calendar_months.into_iter().flat_map(|m| m.days) {
            min_nights = min_nights.or(day.min_nights);
            max_nights = max_nights.or(day.max_nights);
            calendar.insert(
                day.calendar_date,
                CalendarDay {
                    available: day.available,
                    price: day.price.as_ref().map(|p| p.amount),
                    currency: day.price.and_then(|p| p.currency),
                    min_nights: day.min_nights,
                    max_nights: day.max_nights,
                },
            );
        }

        (
            calendar,
            min_nights.unwrap_or(DEFAULT_MIN_NIGHTS),
            max_nights.unwrap_or(DEFAULT_MAX_NIGHTS),
        )
    }
}

// ===== Booking quote =====

#[derive(Debug, Deserialize)]
pub struct BookingQuote {
    pub total: Money,
    #[serde(default)]
    pub nightly: Vec<NightlyPayload>,
}

#[derive(Debug, Deserialize)]
pub struct NightlyPayload {
    pub date: NaiveDate,
    pub amount: f64,
}
