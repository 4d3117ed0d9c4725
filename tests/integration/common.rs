//! Shared fixtures: test configuration, payload builders and request matchers

use rental_harvest::config::{CalendarConfig, Config, MarketplaceConfig, OutputConfig, UserAgentConfig};
use serde_json::{json, Value};
use std::path::Path;
use wiremock::{Match, Request};

/// Creates a test configuration pointing at the mock marketplace
pub fn test_config(base_url: &str, db_path: &Path) -> Config {
    Config {
        marketplace: MarketplaceConfig {
            base_url: base_url.to_string(),
            api_key: Some("test-key".to_string()),
            locale: "en".to_string(),
            currency: "EUR".to_string(),
            items_per_grid: 2,
            reviews_page_size: 2,
            request_timeout_secs: 5,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestHarvest".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        calendar: CalendarConfig::default(),
        output: OutputConfig {
            database_path: db_path.to_string_lossy().into_owned(),
        },
    }
}

/// Explore search response with one section holding the given listing ids
pub fn explore_page(ids: &[&str], has_next_page: bool, items_offset: u32, city: Option<&str>) -> Value {
    let items: Vec<Value> = ids
        .iter()
        .map(|id| {
            json!({
                "listing": {"id": id, "name": format!("Listing {}", id), "reviewsCount": 1},
                "pricingQuote": {"rate": {"amount": 95.0, "currency": "EUR"}, "rateType": "nightly"}
            })
        })
        .collect();

    let mut metadata = json!({
        "paginationMetadata": {"hasNextPage": has_next_page, "itemsOffset": items_offset}
    });
    if let Some(city) = city {
        metadata["geography"] = json!({"city": city, "country": "Portugal"});
    }

    json!({
        "data": {"dora": {"exploreV3": {
            "metadata": metadata,
            "sections": [{"items": items}]
        }}}
    })
}

pub fn listing_detail() -> Value {
    json!({
        "data": {"pdp": {"listing": {
            "roomType": "Entire home",
            "personCapacity": 4,
            "bedrooms": 2,
            "amenities": [{"title": "Wifi"}, {"title": "Pool", "available": false}],
            "host": {"id": 777, "isSuperhost": true}
        }}}
    })
}

pub fn reviews_page(ids: &[u32], total: u32) -> Value {
    let reviews: Vec<Value> = ids
        .iter()
        .map(|id| json!({"id": id, "comments": "Great stay", "rating": 5, "reviewer": {"firstName": "Ana"}}))
        .collect();
    json!({"data": {"pdp": {"reviews": {"reviews": reviews, "metadata": {"reviewsCount": total}}}}})
}

/// Calendar response built from consecutive runs of (available, length) starting 2030-03-01
pub fn calendar_response(runs: &[(bool, i64)], min_nights: u32, max_nights: u32) -> Value {
    let start = chrono::NaiveDate::from_ymd_opt(2030, 3, 1).unwrap();
    let mut days = Vec::new();
    let mut offset = 0;
    for (available, length) in runs {
        for n in offset..offset + length {
            let date = start + chrono::Duration::days(n);
            days.push(json!({
                "calendarDate": date.to_string(),
                "available": available,
                "minNights": min_nights,
                "maxNights": max_nights,
                "price": {"amount": 100.0, "currency": "EUR"}
            }));
        }
        offset += length;
    }
    json!({"data": {"pdp": {"availabilityCalendar": {"calendarMonths": [{"days": days}]}}}})
}

pub fn booking_quote(total: f64, nights: &[(&str, f64)]) -> Value {
    let nightly: Vec<Value> = nights
        .iter()
        .map(|(date, amount)| json!({"date": date, "amount": amount}))
        .collect();
    json!({"data": {"pdp": {"bookingQuote": {
        "total": {"amount": total, "currency": "EUR"},
        "nightly": nightly
    }}}})
}

/// Matches API requests whose `variables.request.<key>` equals a value
pub struct RequestVariable {
    key: &'static str,
    value: Value,
}

pub fn request_variable(key: &'static str, value: impl Into<Value>) -> RequestVariable {
    RequestVariable {
        key,
        value: value.into(),
    }
}

impl Match for RequestVariable {
    fn matches(&self, request: &Request) -> bool {
        request
            .url
            .query_pairs()
            .find(|(name, _)| name == "variables")
            .and_then(|(_, raw)| serde_json::from_str::<Value>(&raw).ok())
            .map_or(false, |variables| variables["request"][self.key] == self.value)
    }
}

/// Matches requests that do not carry the given query parameter
pub struct WithoutQueryParam(pub &'static str);

impl Match for WithoutQueryParam {
    fn matches(&self, request: &Request) -> bool {
        !request.url.query_pairs().any(|(name, _)| name == self.0)
    }
}
