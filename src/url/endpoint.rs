//! Marketplace endpoint construction

use crate::url::SearchParams;
use crate::{UrlError, UrlResult};
use serde_json::{json, Map, Value};
use url::Url;

/// Builds URLs for the marketplace's internal API operations
#[derive(Debug, Clone)]
pub struct Endpoints {
    base: Url,
    locale: String,
    currency: String,
}

impl Endpoints {
    /// Creates an endpoint builder rooted at `base_url`
    ///
    /// # Arguments
    ///
    /// * `base_url` - Marketplace origin, e.g. "https://www.airbnb.com"
    /// * `locale` - Locale sent with every API request
    /// * `currency` - Currency sent with every API request
    pub fn new(base_url: &str, locale: &str, currency: &str) -> UrlResult<Self> {
        let base = Url::parse(base_url).map_err(|e| UrlError::Parse(format!("{}: {}", base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(UrlError::Parse(format!("{} cannot be a base URL", base_url)));
        }

        Ok(Self {
            base,
            locale: locale.to_string(),
            currency: currency.to_string(),
        })
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Builds the URL of an API operation with JSON-encoded `variables`
    pub fn operation_url(&self, operation: &str, variables: &Value) -> Url {
        let mut url = self.base.clone();
        url.set_path(&format!("/api/v3/{}", operation));
        url.query_pairs_mut()
            .clear()
            .append_pair("operationName", operation)
            .append_pair("locale", &self.locale)
            .append_pair("currency", &self.currency)
            .append_pair("variables", &variables.to_string());
        url
    }

    /// Builds the explore search URL for a query and its narrowing parameters
    pub fn explore_url(&self, query: &str, params: &SearchParams, items_per_grid: u32) -> Url {
        let mut request = Map::new();
        request.insert("query".to_string(), json!(query));
        request.insert("itemsPerGrid".to_string(), json!(items_per_grid));
        if let Some(checkin) = params.checkin {
            request.insert("checkin".to_string(), json!(checkin.to_string()));
        }
        if let Some(checkout) = params.checkout {
            request.insert("checkout".to_string(), json!(checkout.to_string()));
        }
        if let Some(price_min) = params.price_min {
            request.insert("priceMin".to_string(), json!(price_min));
        }
        if let Some(price_max) = params.price_max {
            request.insert("priceMax".to_string(), json!(price_max));
        }
        if let Some(adults) = params.adults {
            request.insert("adults".to_string(), json!(adults));
        }

        let mut url = self.operation_url("ExploreSearch", &json!({ "request": request }));
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(offset) = params.items_offset {
                pairs.append_pair("itemsOffset", &offset.to_string());
            }
            for (name, value) in [
                ("ne_lat", params.ne_lat),
                ("ne_lng", params.ne_lng),
                ("sw_lat", params.sw_lat),
                ("sw_lng", params.sw_lng),
            ] {
                if let Some(value) = value {
                    pairs.append_pair(name, &value.to_string());
                }
            }
        }
        url
    }

    /// Direct URL of a listing's public page, used to probe whether it still exists
    pub fn room_url(&self, listing_id: &str) -> Url {
        let mut url = self.base.clone();
        url.set_path(&format!("/rooms/{}", listing_id));
        url.set_query(None);
        url
    }
}
