//! Calendar-month arithmetic for the aggregation window.
//!
//! All billing periods are truncated to the first day of the month, UTC.
//! A month bucket is represented by that first day.

use chrono::{DateTime, Datelike, Months, NaiveDate, TimeZone, Utc};

/// Truncate a date to the first day of its month.
pub fn month_floor(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

/// Truncate a UTC instant to midnight on the first day of its month.
pub fn month_start(instant: DateTime<Utc>) -> DateTime<Utc> {
    let floor = month_floor(instant.date_naive());
    Utc.from_utc_datetime(&floor.and_hms_opt(0, 0, 0).unwrap_or_default())
}

/// Inclusive sequence of month buckets from `from`'s month through `to`'s
/// month. Same month yields exactly one bucket; a reversed range yields none.
pub fn month_span(from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
    let mut months = Vec::new();
    let mut cursor = month_floor(from);
    let last = month_floor(to);

    while cursor <= last {
        months.push(cursor);
        match cursor.checked_add_months(Months::new(1)) {
            Some(next) => cursor = next,
            None => break,
        }
    }

    months
}

/// Whether a subscription billed from `start` until `end` (open-ended when
/// `None`) is active in the given month bucket.
pub fn active_in_month(start: NaiveDate, end: Option<NaiveDate>, month: NaiveDate) -> bool {
    month_floor(start) <= month && end.map_or(true, |e| month_floor(e) >= month)
}
