//! Calendar normalization
//!
//! Marketplaces sometimes report bulk or placeholder bookings that are not
//! real reservations. The normalizer drops booked runs longer than the
//! fabricated-booking threshold and flags runs above the suspicious threshold.

use crate::calendar::ranges::{get_date_ranges, DateRange};
use crate::calendar::{Calendar, RangeStatus};
use crate::config::CalendarConfig;

/// Booked-run length thresholds, in nights
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingThresholds {
    /// Booked runs strictly longer than this are removed
    pub fabricated_nights: u32,

    /// Booked runs strictly longer than this (and not removed) are flagged
    pub suspicious_nights: u32,
}

impl Default for BookingThresholds {
    fn default() -> Self {
        Self {
            fabricated_nights: 62,
            suspicious_nights: 50,
        }
    }
}

impl From<&CalendarConfig> for BookingThresholds {
    fn from(config: &CalendarConfig) -> Self {
        Self {
            fabricated_nights: config.fabricated_booking_nights,
            suspicious_nights: config.suspicious_booking_nights,
        }
    }
}

/// Output of a normalization pass
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedCalendar {
    /// The cleaned calendar
    pub calendar: Calendar,

    /// Booked runs that were dropped as fabricated
    pub removed: Vec<DateRange>,

    /// Booked runs kept but reported as suspicious
    pub flagged: Vec<DateRange>,
}

/// Sanitizes raw calendars before they are persisted
#[derive(Debug, Clone, Default)]
pub struct CalendarNormalizer {
    thresholds: BookingThresholds,
}

impl CalendarNormalizer {
    pub fn new(thresholds: BookingThresholds) -> Self {
        Self { thresholds }
    }

    /// Normalizes a listing's calendar
    ///
    /// # Arguments
    ///
    /// * `listing_id` - Listing the calendar belongs to (used for log events only)
    /// * `calendar` - The raw calendar as fetched
    ///
    /// # Returns
    ///
    /// The cleaned calendar together with the removed and flagged runs
    pub fn normalize(&self, listing_id: &str, calendar: Calendar) -> NormalizedCalendar {
        let mut cleaned = calendar;
        let mut removed = Vec::new();
        let mut flagged = Vec::new();

        for range in get_date_ranges(&cleaned, RangeStatus::Booked) {
            if range.length > self.thresholds.fabricated_nights {
                tracing::debug!(
                    "{}: dropping {} night booking starting {}",
                    listing_id,
                    range.length,
                    range.start
                );
                removed.push(range);
            } else if range.length > self.thresholds.suspicious_nights {
                tracing::warn!("{}: {} day booking", listing_id, range.length);
                flagged.push(range);
            }
        }

        for range in &removed {
            for date in range.dates() {
                cleaned.remove(&date);
            }
        }

        NormalizedCalendar {
            calendar: cleaned,
            removed,
            flagged,
        }
    }
}
