use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Price of one night inside a quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NightlyRate {
    pub date: NaiveDate,
    pub amount: f64,
}

/// A booking quote for one stay starting at the beginning of an available range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateQuote {
    pub checkin: NaiveDate,
    pub checkout: NaiveDate,
    pub nights: u32,
    pub total: f64,

    /// Per-night breakdown; only filled when detailed rate data was requested
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nightly: Vec<NightlyRate>,
}

impl RateQuote {
    pub fn nightly_average(&self) -> f64 {
        if self.nights == 0 {
            return self.total;
        }
        self.total / f64::from(self.nights)
    }
}

/// Pricing data collected for a listing's available date ranges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingDoc {
    pub listing_id: String,
    pub currency: String,
    pub quotes: Vec<RateQuote>,
    pub nightly_min: f64,
    pub nightly_max: f64,
    pub nightly_avg: f64,
    pub fetched_at: DateTime<Utc>,
}

impl PricingDoc {
    /// Summarizes a set of quotes; returns None when there is nothing priced
    pub fn from_quotes(
        listing_id: &str,
        currency: &str,
        quotes: Vec<RateQuote>,
        fetched_at: DateTime<Utc>,
    ) -> Option<Self> {
        if quotes.is_empty() {
            return None;
        }

        let averages: Vec<f64> = quotes.iter().map(RateQuote::nightly_average).collect();
        let nightly_min = averages.iter().copied().fold(f64::INFINITY, f64::min);
        let nightly_max = averages.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let nightly_avg = averages.iter().sum::<f64>() / averages.len() as f64;

        Some(Self {
            listing_id: listing_id.to_string(),
            currency: currency.to_string(),
            quotes,
            nightly_min,
            nightly_max,
            nightly_avg,
            fetched_at,
        })
    }
}
