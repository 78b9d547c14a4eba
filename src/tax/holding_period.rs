//! Holding-period classification
//!
//! US-style "more than one year" rule, calendar-aware: a disposal is
//! long-term iff its date is strictly after the first calendar anniversary
//! of the acquisition (`acquired + 12 months`). A sale exactly on the
//! anniversary is short-term. Feb 29 acquisitions clamp to Feb 28 in
//! non-leap years, so this is not a naive 365-day cutoff.

use chrono::{Months, NaiveDate};

/// Pure, deterministic classification of a single lot slice
pub fn is_long_term(acquired: NaiveDate, disposed: NaiveDate) -> bool {
    match acquired.checked_add_months(Months::new(12)) {
        Some(anniversary) => disposed > anniversary,
        // acquisition date too close to the calendar boundary to ever
        // reach an anniversary; nothing sane maps here
        None => false,
    }
}
