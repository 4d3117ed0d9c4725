//! Date-range extraction
//!
//! Converts a day-by-day calendar into the maximal runs of consecutive dates
//! that share one status.

use crate::calendar::{Calendar, RangeStatus};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// A maximal run of consecutive calendar dates sharing one status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub status: RangeStatus,

    /// First date of the run
    pub start: NaiveDate,

    /// Number of consecutive calendar days in the run
    pub length: u32,
}

impl DateRange {
    /// Last date of the run (inclusive)
    pub fn end(&self) -> NaiveDate {
        self.start + Duration::days(i64::from(self.length) - 1)
    }

    /// Every date covered by the run, in order
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        (0..self.length).map(move |i| self.start + Duration::days(i64::from(i)))
    }

    /// Returns true if `date` is the day immediately after this run
    fn continues_with(&self, date: NaiveDate) -> bool {
        self.end().succ_opt() == Some(date)
    }
}

/// Extracts every maximal run of dates whose status equals `status`
///
/// Runs are returned sorted by start date. A missing date breaks a run even
/// when the days on both sides share the status.
///
/// # Arguments
///
/// * `calendar` - The calendar to scan
/// * `status` - The status to collect runs for
///
/// # Returns
///
/// The ranges in chronological order; empty for an empty calendar
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use rental_harvest::calendar::{get_date_ranges, Calendar, CalendarDay, RangeStatus};
///
/// let mut calendar = Calendar::new();
/// let start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
/// calendar.insert(start, CalendarDay::new(false));
/// calendar.insert(start.succ_opt().unwrap(), CalendarDay::new(false));
///
/// let ranges = get_date_ranges(&calendar, RangeStatus::Booked);
/// assert_eq!(ranges.len(), 1);
/// assert_eq!(ranges[0].length, 2);
/// ```
pub fn get_date_ranges(calendar: &Calendar, status: RangeStatus) -> Vec<DateRange> {
    let mut ranges = Vec::new();
    let mut current: Option<DateRange> = None;

    for (date, day) in calendar {
        if day.status() != status {
            if let Some(range) = current.take() {
                ranges.push(range);
            }
            continue;
        }

        match current.as_mut() {
            Some(range) if range.continues_with(*date) => {
                range.length += 1;
                continue;
            }
            _ => {}
        }

        let started = DateRange {
            status,
            start: *date,
            length: 1,
        };
        if let Some(range) = current.replace(started) {
            ranges.push(range);
        }
    }

    if let Some(range) = current {
        ranges.push(range);
    }

    ranges
}
