//! HTTP client for the marketplace API
//!
//! This module handles all HTTP requests made by the harvester, including:
//! - Building HTTP clients with the configured user agent and API key
//! - Fetching and decoding API operation payloads
//! - Classifying access-denied responses as `ApiError::Forbidden`
//! - Probing listing pages without following redirects

use crate::api::payload::{self, AvailabilityCalendar, BookingQuote, ListingDetail, ReviewsPage, SearchItem};
use crate::api::{CalendarApi, ExistenceProbe, ExploreApi, ListingApi, ReviewsApi, SearchPage};
use crate::calendar::{CalendarFetch, DateRange, NightlyRate, PricingDoc, RateQuote};
use crate::config::{CalendarConfig, Config, MarketplaceConfig, UserAgentConfig};
use crate::listing::{Geography, Listing, Review};
use crate::state::SectionCache;
use crate::url::{Endpoints, SearchParams};
use crate::{ApiError, ApiResult, ConfigError, HarvestError};
use async_trait::async_trait;
use chrono::{Datelike, Duration, Utc};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{redirect::Policy, Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use url::Url;

/// Header carrying the marketplace API key
const API_KEY_HEADER: &str = "x-api-key";

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `marketplace` - Marketplace access configuration (timeout, API key)
/// * `follow_redirects` - Whether redirects are followed automatically
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(HarvestError)` - Invalid API key or client construction failure
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    marketplace: &MarketplaceConfig,
    follow_redirects: bool,
) -> Result<Client, HarvestError> {
    // Format: CrawlerName/Version (+ContactURL; ContactEmail)
    let agent = format!(
        "{}/{} (+{}; {})",
        user_agent.crawler_name,
        user_agent.crawler_version,
        user_agent.contact_url,
        user_agent.contact_email
    );

    let mut headers = HeaderMap::new();
    if let Some(key) = &marketplace.api_key {
        let value = HeaderValue::from_str(key).map_err(|_| {
            ConfigError::Validation("api_key contains characters not allowed in a header".to_string())
        })?;
        headers.insert(API_KEY_HEADER, value);
    }

    let redirect = if follow_redirects {
        Policy::limited(10)
    } else {
        Policy::none()
    };

    let client = Client::builder()
        .user_agent(agent)
        .default_headers(headers)
        .timeout(std::time::Duration::from_secs(marketplace.request_timeout_secs))
        .connect_timeout(std::time::Duration::from_secs(10))
        .redirect(redirect)
        .gzip(true)
        .brotli(true)
        .build()?;

    Ok(client)
}

/// Marketplace API client implementing every collaborator trait
pub struct MarketplaceClient {
    client: Client,
    probe_client: Client,
    endpoints: Endpoints,
    items_per_grid: u32,
    reviews_page_size: u32,
    calendar_months: u32,
    max_rate_quotes: u32,
}

impl MarketplaceClient {
    /// Creates a client from the full configuration
    pub fn new(config: &Config) -> Result<Self, HarvestError> {
        Self::with_settings(&config.marketplace, &config.user_agent, &config.calendar)
    }

    /// Creates a client from its individual configuration sections
    pub fn with_settings(
        marketplace: &MarketplaceConfig,
        user_agent: &UserAgentConfig,
        calendar: &CalendarConfig,
    ) -> Result<Self, HarvestError> {
        let endpoints = Endpoints::new(
            &marketplace.base_url,
            &marketplace.locale,
            &marketplace.currency,
        )?;

        Ok(Self {
            client: build_http_client(user_agent, marketplace, true)?,
            probe_client: build_http_client(user_agent, marketplace, false)?,
            endpoints,
            items_per_grid: marketplace.items_per_grid,
            reviews_page_size: marketplace.reviews_page_size,
            calendar_months: calendar.months,
            max_rate_quotes: calendar.max_rate_quotes,
        })
    }

    /// Fetches a URL and decodes its JSON body
    ///
    /// HTTP 403 maps to `ApiError::Forbidden`; any other non-success status
    /// maps to `ApiError::Status`. A body that is not JSON maps to
    /// `ApiError::Payload`.
    async fn get_json(&self, url: &Url) -> ApiResult<Value> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| ApiError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if status == StatusCode::FORBIDDEN {
            return Err(ApiError::Forbidden {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(ApiError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|source| ApiError::Http {
            url: url.to_string(),
            source,
        })?;

        serde_json::from_str(&body).map_err(|e| ApiError::Payload {
            url: url.to_string(),
            message: format!("invalid JSON body: {}", e),
        })
    }

    /// Fetches a URL and decodes the document found at `pointer`
    async fn get_payload<T: DeserializeOwned>(&self, url: &Url, pointer: &str) -> ApiResult<T> {
        let document = self.get_json(url).await?;
        let value = document.pointer(pointer).cloned().ok_or_else(|| ApiError::Payload {
            url: url.to_string(),
            message: format!("missing {}", pointer),
        })?;

        serde_json::from_value(value).map_err(|e| ApiError::Payload {
            url: url.to_string(),
            message: format!("{}: {}", pointer, e),
        })
    }
}

#[async_trait]
impl ExploreApi for MarketplaceClient {
    fn search_url(&self, query: &str, params: &SearchParams) -> Url {
        self.endpoints.explore_url(query, params, self.items_per_grid)
    }

    async fn search(&self, url: &Url) -> ApiResult<SearchPage> {
        let data = self.get_json(url).await?;
        let pagination = payload::parse_pagination(&data).ok_or_else(|| ApiError::Payload {
            url: url.to_string(),
            message: format!("missing {}", payload::PAGINATION),
        })?;

        Ok(SearchPage { data, pagination })
    }
}

#[async_trait]
impl ListingApi for MarketplaceClient {
    fn collect_listing_ids(&self, data: &Value, cache: &mut SectionCache) -> ApiResult<Vec<String>> {
        payload::collect_section_items(data, cache).ok_or_else(|| ApiError::Payload {
            url: "search response".to_string(),
            message: format!("missing {}", payload::EXPLORE_ROOT),
        })
    }

    async fn get_listing(
        &self,
        listing_id: &str,
        cache: &SectionCache,
        geography: &Geography,
        reviews: Vec<Review>,
    ) -> ApiResult<Listing> {
        let url = self
            .endpoints
            .operation_url("PdpListingDetail", &json!({"request": {"id": listing_id}}));
        let detail: ListingDetail = self.get_payload(&url, payload::LISTING_DETAIL).await?;

        let item = match cache.get(listing_id) {
            Some(value) => serde_json::from_value::<SearchItem>(value.clone()).unwrap_or_else(|e| {
                tracing::warn!("{}: unreadable search item, using detail only: {}", listing_id, e);
                SearchItem::default()
            }),
            None => SearchItem::default(),
        };

        Ok(payload::assemble_listing(
            listing_id,
            self.endpoints.room_url(listing_id).to_string(),
            detail,
            item,
            geography,
            reviews,
            Utc::now(),
        ))
    }
}

#[async_trait]
impl ReviewsApi for MarketplaceClient {
    async fn get_reviews(&self, listing_id: &str) -> ApiResult<Vec<Review>> {
        let mut reviews = Vec::new();

        loop {
            let url = self.endpoints.operation_url(
                "PdpReviews",
                &json!({"request": {
                    "listingId": listing_id,
                    "limit": self.reviews_page_size,
                    "offset": reviews.len(),
                }}),
            );
            let page: ReviewsPage = self.get_payload(&url, payload::REVIEWS).await?;

            let fetched = page.reviews.len();
            reviews.extend(page.reviews.into_iter().map(|r| r.into_review()));

            let total = page.metadata.reviews_count.map(|n| n as usize);
            if fetched == 0
                || fetched < self.reviews_page_size as usize
                || total.map_or(false, |total| reviews.len() >= total)
            {
                break;
            }
        }

        tracing::debug!("{}: {} reviews", listing_id, reviews.len());
        Ok(reviews)
    }
}

#[async_trait]
impl CalendarApi for MarketplaceClient {
    async fn get_calendar(&self, listing_id: &str) -> ApiResult<CalendarFetch> {
        let today = Utc::now().date_naive();
        let url = self.endpoints.operation_url(
            "PdpAvailabilityCalendar",
            &json!({"request": {
                "listingId": listing_id,
                "month": today.month(),
                "year": today.year(),
                "count": self.calendar_months,
            }}),
        );

        let payload: AvailabilityCalendar = self.get_payload(&url, payload::AVAILABILITY).await?;
        let (calendar, min_nights, max_nights) = payload.into_calendar();

        Ok(CalendarFetch {
            calendar,
            min_nights,
            max_nights,
        })
    }

    async fn get_rate_data(
        &self,
        listing_id: &str,
        ranges: &[DateRange],
        min_nights: u32,
        max_nights: u32,
        detailed: bool,
    ) -> ApiResult<Option<PricingDoc>> {
        let nights = min_nights.max(1);
        if nights > max_nights {
            tracing::debug!(
                "{}: minimum stay {} exceeds maximum {}",
                listing_id,
                nights,
                max_nights
            );
            return Ok(None);
        }

        let mut quotes = Vec::new();
        let mut currency: Option<String> = None;

        let bookable = ranges.iter().filter(|r| r.length >= nights);
        for range in bookable.take(self.max_rate_quotes as usize) {
            let checkin = range.start;
            let checkout = checkin + Duration::days(i64::from(nights));
            let url = self.endpoints.operation_url(
                "StaysPdpBookingQuote",
                &json!({"request": {
                    "listingId": listing_id,
                    "checkin": checkin.to_string(),
                    "checkout": checkout.to_string(),
                    "adults": 1,
                }}),
            );

            let quote: Option<BookingQuote> = self.get_payload(&url, payload::BOOKING_QUOTE).await?;
            let Some(quote) = quote else {
                tracing::debug!("{}: no quote for {} to {}", listing_id, checkin, checkout);
                continue;
            };

            if currency.is_none() {
                currency = quote.total.currency.clone();
            }

            let nightly = if detailed {
                quote
                    .nightly
                    .into_iter()
                    .map(|n| NightlyRate {
                        date: n.date,
                        amount: n.amount,
                    })
                    .collect()
            } else {
                Vec::new()
            };

            quotes.push(RateQuote {
                checkin,
                checkout,
                nights,
                total: quote.total.amount,
                nightly,
            });
        }

        let currency = currency.unwrap_or_else(|| self.endpoints.currency().to_string());
        Ok(PricingDoc::from_quotes(listing_id, &currency, quotes, Utc::now()))
    }
}

#[async_trait]
impl ExistenceProbe for MarketplaceClient {
    async fn probe_listing(&self, listing_id: &str) -> ApiResult<u16> {
        let url = self.endpoints.room_url(listing_id);
        tracing::debug!("Probing {}", url);

        let response = self
            .probe_client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| ApiError::Http {
                url: url.to_string(),
                source,
            })?;

        Ok(response.status().as_u16())
    }
}
