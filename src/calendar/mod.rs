//! Calendar mapper.
//!
//! Converts named calendar periods (months) into absolute week-indices on
//! the flattened timeline used by the solver, and back again for display.
//!
//! # Examples
//!
//! ```
//! use u_itinerary::calendar::weeks_for;
//!
//! let weeks = weeks_for(&["December", "January"]).unwrap();
//! assert!(weeks.contains(&48)); // first-cycle December
//! assert!(weeks.contains(&56)); // January
//! assert!(weeks.contains(&103)); // second-cycle December
//! ```

mod table;

pub use table::{WeekRange, WEEKS_PER_CYCLE, WEEK_TABLE};

use crate::error::{ItineraryError, Result};
use std::collections::BTreeSet;
use std::fmt;

/// Looks up the ranges for a period name (ASCII case-insensitive).
pub fn period_ranges(period: &str) -> Option<&'static [WeekRange]> {
    let period = period.trim();
    WEEK_TABLE
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(period))
        .map(|(_, ranges)| *ranges)
}

/// Returns the sorted, deduplicated union of weeks spanned by `periods`.
///
/// # Errors
///
/// [`ItineraryError::UnknownPeriod`] for the first name missing from the
/// table.
pub fn weeks_for<S: AsRef<str>>(periods: &[S]) -> Result<BTreeSet<i64>> {
    let mut weeks = BTreeSet::new();
    for period in periods {
        let period = period.as_ref();
        let ranges = period_ranges(period).ok_or_else(|| ItineraryError::UnknownPeriod {
            period: period.to_string(),
        })?;
        for &(start, end) in ranges {
            weeks.extend(start..end);
        }
    }
    Ok(weeks)
}

/// Half-open span `[first, last)` covered by the table.
pub fn calendar_span() -> (i64, i64) {
    let ranges = WEEK_TABLE.iter().flat_map(|(_, r)| r.iter());
    let first = ranges.clone().map(|r| r.0).min().unwrap_or(0);
    let last = ranges.map(|r| r.1).max().unwrap_or(0);
    (first, last)
}

/// A week-index resolved back to its calendar period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekLabel {
    /// Period name from [`WEEK_TABLE`].
    pub period: &'static str,
    /// 0 for weeks in the first yearly cycle, 1 for the second.
    pub cycle: u8,
    /// 1-based week within the period.
    pub week_of_period: u8,
}

impl fmt::Display for WeekLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<9} Y{}, week {}",
            self.period,
            self.cycle + 1,
            self.week_of_period
        )
    }
}

/// Resolves a week-index to its period, or `None` outside the table.
///
/// A half-open end week (the week after a section finishes) resolves like
/// any other index.
pub fn week_label(week: i64) -> Option<WeekLabel> {
    for &(name, ranges) in WEEK_TABLE {
        for &(start, end) in ranges {
            if (start..end).contains(&week) {
                return Some(WeekLabel {
                    period: name,
                    cycle: if week > WEEKS_PER_CYCLE { 1 } else { 0 },
                    week_of_period: (week - start + 1) as u8,
                });
            }
        }
    }
    None
}
