//! Resolved schedules.

use crate::calendar::week_label;
use std::fmt;

/// One section's resolved half-open interval `[start_week, end_week)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScheduledSection {
    pub name: String,
    pub start_week: i64,
    pub end_week: i64,
}

impl ScheduledSection {
    /// Creates a resolved section occupying `[start_week, end_week)`.
    pub fn new(name: impl Into<String>, start_week: i64, end_week: i64) -> Self {
        Self {
            name: name.into(),
            start_week,
            end_week,
        }
    }

    /// Number of weeks occupied.
    pub fn weeks(&self) -> i64 {
        self.end_week - self.start_week
    }

    /// Whether the two sections share a boundary.
    pub fn touches(&self, other: &ScheduledSection) -> bool {
        self.start_week == other.end_week || self.end_week == other.start_week
    }
}

fn label(week: i64) -> String {
    match week_label(week) {
        Some(l) => l.to_string(),
        None => format!("week {week}"),
    }
}

impl fmt::Display for ScheduledSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<25} {:<2} weeks: {} to {}",
            self.name,
            self.weeks(),
            label(self.start_week),
            label(self.end_week)
        )
    }
}

/// A single feasible assignment of every section, sorted by start week.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolutionRecord {
    sections: Vec<ScheduledSection>,
}

impl SolutionRecord {
    /// Builds a record, sorting sections by start week (then name).
    pub fn new(mut sections: Vec<ScheduledSection>) -> Self {
        sections.sort_by(|a, b| {
            a.start_week
                .cmp(&b.start_week)
                .then_with(|| a.name.cmp(&b.name))
        });
        Self { sections }
    }

    /// Sections in travel order.
    pub fn sections(&self) -> &[ScheduledSection] {
        &self.sections
    }

    /// Iterates sections in travel order.
    pub fn iter(&self) -> std::slice::Iter<'_, ScheduledSection> {
        self.sections.iter()
    }

    /// Number of sections.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Looks up a section by name.
    pub fn get(&self, name: &str) -> Option<&ScheduledSection> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Section names in travel order.
    pub fn order(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.name.as_str()).collect()
    }

    /// `(name, start_week, end_week)` triples in travel order.
    pub fn triples(&self) -> Vec<(&str, i64, i64)> {
        self.sections
            .iter()
            .map(|s| (s.name.as_str(), s.start_week, s.end_week))
            .collect()
    }
}

impl<'a> IntoIterator for &'a SolutionRecord {
    type Item = &'a ScheduledSection;
    type IntoIter = std::slice::Iter<'a, ScheduledSection>;

    fn into_iter(self) -> Self::IntoIter {
        self.sections.iter()
    }
}

impl fmt::Display for SolutionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for section in &self.sections {
            writeln!(f, "{section}")?;
        }
        Ok(())
    }
}
