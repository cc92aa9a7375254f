//! Translation of section specs into a CP model.

use super::record::{ScheduledSection, SolutionRecord};
use crate::calendar::calendar_span;
use crate::cp::{Assignment, CpModel, IntervalId, IntervalVar};
use crate::error::{ItineraryError, Result};
use crate::section::{count_weeks, SectionSpec};
use std::collections::HashMap;
use tracing::{debug, warn};

/// A section's start window after intersecting its season with the
/// horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionWindow {
    /// `max(start_week, first allowed week)`.
    pub earliest_start: i64,
    /// `min(end_week, last allowed week + 1)`, exclusive.
    pub latest_end: i64,
    /// Starts in `[earliest_start, latest_end - duration]` whose every
    /// covered week is allowed.
    pub candidate_starts: usize,
}

impl SectionWindow {
    /// Whether no start fits the season inside the horizon.
    pub fn is_empty(&self) -> bool {
        self.candidate_starts == 0
    }
}

/// Builds a [`ScheduleModel`] from a full set of sections and an anchor
/// week.
///
/// # Examples
///
/// ```
/// use u_itinerary::schedule::ScheduleBuilder;
/// use u_itinerary::section::SectionSpec;
///
/// let model = ScheduleBuilder::new(1)
///     .section(SectionSpec::from_weeks("A", 1..11, 4).unwrap())
///     .section(SectionSpec::from_weeks("B", 1..11, 6).unwrap())
///     .build()
///     .unwrap();
/// assert_eq!(model.end_week(), 11);
/// ```
#[derive(Debug, Clone)]
pub struct ScheduleBuilder {
    start_week: i64,
    sections: Vec<SectionSpec>,
}

impl ScheduleBuilder {
    /// Starts an empty trip anchored at `start_week`.
    pub fn new(start_week: i64) -> Self {
        Self {
            start_week,
            sections: Vec::new(),
        }
    }

    pub fn section(mut self, spec: SectionSpec) -> Self {
        self.sections.push(spec);
        self
    }

    pub fn sections(mut self, specs: impl IntoIterator<Item = SectionSpec>) -> Self {
        self.sections.extend(specs);
        self
    }

    /// Validates cross-references and constructs the model.
    ///
    /// # Errors
    ///
    /// - [`ItineraryError::DuplicateSection`] for a repeated name
    /// - [`ItineraryError::UnknownSection`] for a neighbour that is not in
    ///   the set (or is the section itself)
    /// - [`ItineraryError::HorizonExceedsCalendar`] and
    ///   [`ItineraryError::HorizonBeforeCalendar`] when calendar-based
    ///   sections are scheduled outside the week table
    /// - [`ItineraryError::HorizonOverflow`] when the horizon end does not
    ///   fit in an `i64`
    ///
    /// An empty window is not an error; the solver reports it as
    /// infeasible.
    pub fn build(self) -> Result<ScheduleModel> {
        let index = index_by_name(&self.sections)?;
        check_neighbours(&self.sections, &index)?;

        let start_week = self.start_week;
        let (total_weeks, end_week) = count_weeks(&self.sections)
            .and_then(|total| Some((total, start_week.checked_add(total)?)))
            .ok_or(ItineraryError::HorizonOverflow { start_week })?;

        if self.sections.iter().any(SectionSpec::is_calendar_based) {
            let (calendar_start, calendar_end) = calendar_span();
            if start_week < calendar_start {
                return Err(ItineraryError::HorizonBeforeCalendar {
                    horizon_start: start_week,
                    calendar_start,
                });
            }
            if end_week > calendar_end {
                return Err(ItineraryError::HorizonExceedsCalendar {
                    horizon_end: end_week,
                    calendar_end,
                });
            }
        }

        let mut cp = CpModel::new(format!(
            "itinerary-{}-sections-{}-weeks",
            self.sections.len(),
            total_weeks
        ));
        let mut ids = Vec::with_capacity(self.sections.len());
        let mut windows = Vec::with_capacity(self.sections.len());

        for spec in &self.sections {
            let window = section_window(spec, start_week, end_week);
            if window.is_empty() {
                warn!(
                    section = spec.name(),
                    earliest_start = window.earliest_start,
                    latest_end = window.latest_end,
                    duration = spec.duration(),
                    "section has no feasible start inside the horizon"
                );
            } else {
                debug!(
                    section = spec.name(),
                    earliest_start = window.earliest_start,
                    latest_end = window.latest_end,
                    candidates = window.candidate_starts,
                    "section window"
                );
            }

            let id = cp.add_interval(IntervalVar::new(
                spec.name(),
                window.earliest_start,
                window.latest_end - spec.duration(),
                spec.duration(),
            ));
            cp.add_allowed_times(id, spec.allowed_weeks().clone());
            ids.push(id);
            windows.push(window);
        }

        if !ids.is_empty() {
            cp.add_no_overlap(ids.clone());
            cp.add_contiguous(ids.clone(), start_week);
        }

        for (i, spec) in self.sections.iter().enumerate() {
            for neighbour in spec.required_neighbours() {
                cp.add_adjacent(ids[i], ids[index[neighbour.as_str()]]);
            }
            for neighbour in spec.banned_neighbours() {
                cp.add_not_adjacent(ids[i], ids[index[neighbour.as_str()]]);
            }
        }

        cp.validate()?;

        Ok(ScheduleModel {
            cp,
            sections: self.sections,
            ids,
            windows,
            start_week,
            end_week,
        })
    }
}

fn index_by_name(sections: &[SectionSpec]) -> Result<HashMap<&str, usize>> {
    let mut index = HashMap::with_capacity(sections.len());
    for (i, spec) in sections.iter().enumerate() {
        if index.insert(spec.name(), i).is_some() {
            return Err(ItineraryError::DuplicateSection {
                name: spec.name().to_string(),
            });
        }
    }
    Ok(index)
}

fn check_neighbours(sections: &[SectionSpec], index: &HashMap<&str, usize>) -> Result<()> {
    for spec in sections {
        let neighbours = spec
            .required_neighbours()
            .iter()
            .chain(spec.banned_neighbours());
        for neighbour in neighbours {
            if neighbour == spec.name() || !index.contains_key(neighbour.as_str()) {
                return Err(ItineraryError::UnknownSection {
                    section: spec.name().to_string(),
                    neighbour: neighbour.clone(),
                });
            }
        }
    }
    Ok(())
}

fn section_window(spec: &SectionSpec, start_week: i64, end_week: i64) -> SectionWindow {
    let allowed = spec.allowed_weeks();
    let (Some(&first), Some(&last)) = (allowed.first(), allowed.last()) else {
        return SectionWindow {
            earliest_start: start_week,
            latest_end: start_week,
            candidate_starts: 0,
        };
    };

    let earliest_start = start_week.max(first);
    let latest_end = end_week.min(last.saturating_add(1));
    let duration = spec.duration();
    let candidate_starts = (earliest_start..=latest_end - duration)
        .filter(|s| (*s..*s + duration).all(|w| allowed.contains(&w)))
        .count();

    SectionWindow {
        earliest_start,
        latest_end,
        candidate_starts,
    }
}

/// A built scheduling model, ready for enumeration.
///
/// Owns the sections and the CP model; one instance per solve.
#[derive(Debug, Clone)]
pub struct ScheduleModel {
    cp: CpModel,
    sections: Vec<SectionSpec>,
    ids: Vec<IntervalId>,
    windows: Vec<SectionWindow>,
    start_week: i64,
    end_week: i64,
}

impl ScheduleModel {
    /// The underlying constraint model.
    pub fn cp(&self) -> &CpModel {
        &self.cp
    }

    /// Sections in insertion order.
    pub fn sections(&self) -> &[SectionSpec] {
        &self.sections
    }

    /// Windows, parallel to [`sections`](Self::sections).
    pub fn windows(&self) -> &[SectionWindow] {
        &self.windows
    }

    /// Window of the named section.
    pub fn window(&self, name: &str) -> Option<&SectionWindow> {
        self.sections
            .iter()
            .position(|s| s.name() == name)
            .map(|i| &self.windows[i])
    }

    /// First week of the horizon.
    pub fn start_week(&self) -> i64 {
        self.start_week
    }

    /// Exclusive end of the horizon.
    pub fn end_week(&self) -> i64 {
        self.end_week
    }

    pub fn total_weeks(&self) -> i64 {
        self.end_week - self.start_week
    }

    /// Whether some section cannot start anywhere, making the model
    /// trivially infeasible.
    pub fn has_empty_window(&self) -> bool {
        self.windows.iter().any(SectionWindow::is_empty)
    }

    /// Resolves a solver assignment into a sorted record.
    pub fn record(&self, assignment: &Assignment<'_>) -> SolutionRecord {
        let sections = self
            .sections
            .iter()
            .zip(&self.ids)
            .map(|(spec, &id)| {
                ScheduledSection::new(spec.name(), assignment.start(id), assignment.end(id))
            })
            .collect();
        SolutionRecord::new(sections)
    }
}
