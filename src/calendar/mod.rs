//! Booking calendar types and algorithms
//!
//! This module owns the day-level calendar model and the two pure algorithms
//! that work on it:
//! - Date-range extraction (maximal runs of one status)
//! - Calendar normalization (dropping fabricated long bookings)
//!
//! It also defines the pricing document produced from a listing's available
//! date ranges.

mod normalize;
mod pricing;
mod ranges;

pub use normalize::{BookingThresholds, CalendarNormalizer, NormalizedCalendar};
pub use pricing::{NightlyRate, PricingDoc, RateQuote};
pub use ranges::{get_date_ranges, DateRange};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A listing's day-by-day calendar, always iterated in chronological order
pub type Calendar = BTreeMap<NaiveDate, CalendarDay>;

/// Status record for a single calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarDay {
    /// Whether the day can still be booked
    pub available: bool,

    /// Advertised nightly price for the day, if the marketplace reported one
    pub price: Option<f64>,

    /// Currency of `price`
    pub currency: Option<String>,

    /// Minimum stay length for a check-in on this day
    pub min_nights: Option<u32>,

    /// Maximum stay length for a check-in on this day
    pub max_nights: Option<u32>,
}

impl CalendarDay {
    /// Creates a day with only the availability flag set
    pub fn new(available: bool) -> Self {
        Self {
            available,
            price: None,
            currency: None,
            min_nights: None,
            max_nights: None,
        }
    }

    /// Classifies the day as available or booked
    pub fn status(&self) -> RangeStatus {
        if self.available {
            RangeStatus::Available
        } else {
            RangeStatus::Booked
        }
    }
}

/// Status classification shared by every day of a date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeStatus {
    Available,
    Booked,
}

impl RangeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Booked => "booked",
        }
    }
}

impl fmt::Display for RangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A freshly fetched calendar with the listing's stay-length bounds
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarFetch {
    pub calendar: Calendar,
    pub min_nights: u32,
    pub max_nights: u32,
}
