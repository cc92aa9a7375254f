//! Immutable description of one travel leg.

use crate::calendar::weeks_for;
use crate::error::{ItineraryError, Result};
use std::collections::BTreeSet;
use std::fmt;

/// One fixed-duration leg of a trip together with its seasonal window and
/// adjacency rules.
///
/// Neighbour sets may name sections that do not exist yet; they are
/// resolved when the full set is handed to
/// [`ScheduleBuilder`](crate::schedule::ScheduleBuilder).
///
/// # Examples
///
/// ```
/// use u_itinerary::section::SectionSpec;
///
/// let nz = SectionSpec::new("New Zealand", &["January", "February", "March"], 4)
///     .unwrap()
///     .with_banned_neighbours(["South America"]);
/// assert_eq!(nz.duration(), 4);
/// assert!(nz.allowed_weeks().contains(&53));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionSpec {
    name: String,
    periods: Vec<String>,
    allowed_weeks: BTreeSet<i64>,
    calendar_based: bool,
    duration: i64,
    required_neighbours: BTreeSet<String>,
    banned_neighbours: BTreeSet<String>,
}

impl SectionSpec {
    /// Creates a section viable in the given calendar periods.
    ///
    /// # Errors
    ///
    /// [`ItineraryError::InvalidDuration`] if `duration <= 0`,
    /// [`ItineraryError::UnknownPeriod`] for an unknown period name.
    pub fn new<S: AsRef<str>>(name: impl Into<String>, periods: &[S], duration: i64) -> Result<Self> {
        let name = name.into();
        check_duration(&name, duration)?;
        let allowed_weeks = weeks_for(periods)?;
        Ok(Self {
            name,
            periods: periods.iter().map(|p| p.as_ref().to_string()).collect(),
            allowed_weeks,
            calendar_based: true,
            duration,
            required_neighbours: BTreeSet::new(),
            banned_neighbours: BTreeSet::new(),
        })
    }

    /// Creates a section from an explicit set of allowed week-indices.
    ///
    /// The section is not tied to the calendar table, so the horizon check
    /// in the builder does not apply to it.
    pub fn from_weeks(
        name: impl Into<String>,
        weeks: impl IntoIterator<Item = i64>,
        duration: i64,
    ) -> Result<Self> {
        let name = name.into();
        check_duration(&name, duration)?;
        Ok(Self {
            name,
            periods: Vec::new(),
            allowed_weeks: weeks.into_iter().collect(),
            calendar_based: false,
            duration,
            required_neighbours: BTreeSet::new(),
            banned_neighbours: BTreeSet::new(),
        })
    }

    /// Adds sections that must directly abut this one.
    pub fn with_required_neighbours<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_neighbours
            .extend(names.into_iter().map(Into::into));
        self
    }

    /// Adds sections that must not directly abut this one.
    pub fn with_banned_neighbours<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.banned_neighbours.extend(names.into_iter().map(Into::into));
        self
    }

    /// Unique name, the join key for neighbour rules.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Calendar periods this section was built from (empty for
    /// [`from_weeks`](Self::from_weeks)).
    pub fn periods(&self) -> &[String] {
        &self.periods
    }

    /// Whether the section was built from calendar periods, even an empty
    /// list of them.
    pub fn is_calendar_based(&self) -> bool {
        self.calendar_based
    }

    /// Sorted week-indices the section may occupy.
    pub fn allowed_weeks(&self) -> &BTreeSet<i64> {
        &self.allowed_weeks
    }

    /// Fixed length in weeks, always positive.
    pub fn duration(&self) -> i64 {
        self.duration
    }

    /// Sections that must share a boundary with this one.
    pub fn required_neighbours(&self) -> &BTreeSet<String> {
        &self.required_neighbours
    }

    /// Sections that must not share a boundary with this one.
    pub fn banned_neighbours(&self) -> &BTreeSet<String> {
        &self.banned_neighbours
    }

    /// Necessary (not sufficient) feasibility condition.
    pub fn fits_window(&self) -> bool {
        self.duration <= self.allowed_weeks.len() as i64
    }
}

fn check_duration(name: &str, duration: i64) -> Result<()> {
    if duration <= 0 {
        return Err(ItineraryError::InvalidDuration {
            section: name.to_string(),
            duration,
        });
    }
    Ok(())
}

impl fmt::Display for SectionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} weeks", self.name, self.duration)?;
        if !self.calendar_based {
            write!(f, ", {} allowed weeks", self.allowed_weeks.len())?;
        } else {
            write!(f, ", only in {}", self.periods.join(", "))?;
        }
        if !self.required_neighbours.is_empty() {
            write!(f, ", must be adjacent to {}", join(&self.required_neighbours))?;
        }
        if !self.banned_neighbours.is_empty() {
            write!(f, ", not adjacent to {}", join(&self.banned_neighbours))?;
        }
        Ok(())
    }
}

fn join(names: &BTreeSet<String>) -> String {
    names.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

/// Total weeks over all sections, or `None` if the sum overflows.
pub fn count_weeks(sections: &[SectionSpec]) -> Option<i64> {
    sections
        .iter()
        .try_fold(0i64, |total, s| total.checked_add(s.duration))
}
