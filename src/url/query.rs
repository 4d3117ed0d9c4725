//! Decoding of search filters from previously issued search URLs
//!
//! Some filters are only echoed back in the request URL and not retained by
//! the server across pages, so each new page request re-applies the filters
//! found in the previous request.

use crate::url::SearchParams;
use crate::{UrlError, UrlResult};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

/// Filters carried inside the `variables.request` object of a search URL
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CarriedFilters {
    checkin: Option<NaiveDate>,
    checkout: Option<NaiveDate>,
    price_min: Option<u32>,
    price_max: Option<u32>,
}

/// Decodes the JSON `variables` query parameter of an API URL
pub fn read_variables(url: &Url) -> UrlResult<Value> {
    let raw = url
        .query_pairs()
        .find(|(name, _)| name == "variables")
        .map(|(_, value)| value.into_owned())
        .ok_or_else(|| UrlError::MissingVariables(url.to_string()))?;

    serde_json::from_str(&raw).map_err(|e| UrlError::InvalidVariables(e.to_string()))
}

/// Copies the search-narrowing filters of a previous search URL into `params`
///
/// Check-in/check-out dates and price bounds are read from the JSON
/// `variables.request` object; the four bounding-box coordinates are read
/// from the plain query string. Each value is copied only if present, so
/// unrelated parameters are left untouched.
///
/// # Arguments
///
/// * `params` - Parameters for the next search request
/// * `url` - URL of the previous search request
pub fn carry_forward_params(params: &mut SearchParams, url: &Url) -> UrlResult<()> {
    let variables = read_variables(url)?;
    let request = variables
        .get("request")
        .cloned()
        .ok_or_else(|| UrlError::InvalidVariables("missing request object".to_string()))?;
    let filters: CarriedFilters =
        serde_json::from_value(request).map_err(|e| UrlError::InvalidVariables(e.to_string()))?;

    if let Some(checkin) = filters.checkin {
        params.checkin = Some(checkin);
        if filters.checkout.is_some() {
            params.checkout = filters.checkout;
        }
    }
    if let Some(price_max) = filters.price_max {
        params.price_max = Some(price_max);
    }
    if let Some(price_min) = filters.price_min {
        params.price_min = Some(price_min);
    }

    for (name, value) in url.query_pairs() {
        let slot = match &*name {
            "ne_lat" => &mut params.ne_lat,
            "ne_lng" => &mut params.ne_lng,
            "sw_lat" => &mut params.sw_lat,
            "sw_lng" => &mut params.sw_lng,
            _ => continue,
        };
        let coordinate: f64 = value
            .parse()
            .map_err(|_| UrlError::Parse(format!("invalid coordinate {}={}", name, value)))?;
        *slot = Some(coordinate);
    }

    Ok(())
}
