//! Solution sinks.
//!
//! The enumerator hands each [`SolutionRecord`] to a sink exactly once and
//! keeps nothing itself. Sinks run synchronously on the search thread, so
//! they should be cheap.

use super::enumerator::EnumerationSummary;
use super::record::SolutionRecord;
use std::collections::BTreeMap;
use std::io::{self, Write};

/// Consumer of enumerated solutions, scoped to one enumeration.
pub trait SolutionSink {
    /// Receives one solution.
    fn accept(&mut self, record: &SolutionRecord);

    /// Called once after the search ends.
    fn finish(&mut self, _summary: &EnumerationSummary) {}
}

impl<F> SolutionSink for F
where
    F: FnMut(&SolutionRecord),
{
    fn accept(&mut self, record: &SolutionRecord) {
        self(record)
    }
}

/// Counts solutions and discards them.
#[derive(Debug, Clone, Copy, Default)]
pub struct CountingSink {
    count: u64,
}

impl CountingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

impl SolutionSink for CountingSink {
    fn accept(&mut self, _record: &SolutionRecord) {
        self.count += 1;
    }
}

/// Keeps every solution in memory. Only for spaces known to be small.
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    records: Vec<SolutionRecord>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[SolutionRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<SolutionRecord> {
        self.records
    }
}

impl SolutionSink for CollectingSink {
    fn accept(&mut self, record: &SolutionRecord) {
        self.records.push(record.clone());
    }
}

/// Appends a human-readable log of every solution to a writer.
///
/// Write errors cannot be returned from [`SolutionSink::accept`], so the
/// first one is stored and later writes are skipped. Check it with
/// [`take_error`](Self::take_error) after the enumeration.
pub struct WriterSink<W: Write> {
    writer: W,
    count: u64,
    last_error: Option<io::Error>,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            count: 0,
            last_error: None,
        }
    }

    /// Take the stored write error, if any.
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.last_error.take()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: io::Result<()>) {
        if let Err(e) = result {
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: Write> SolutionSink for WriterSink<W> {
    fn accept(&mut self, record: &SolutionRecord) {
        self.count += 1;
        if self.last_error.is_some() {
            return;
        }
        let result = write!(self.writer, "\nSolution: {}\n{}", self.count, record);
        self.store_err(result);
    }

    fn finish(&mut self, summary: &EnumerationSummary) {
        if self.last_error.is_some() {
            return;
        }
        let result = writeln!(self.writer, "\n{summary}").and_then(|_| self.writer.flush());
        self.store_err(result);
    }
}

/// Per-section, per-week occupancy counts across all solutions.
///
/// This is the data behind a calendar heatmap: for each section, how many
/// solutions place it in each week.
#[derive(Debug, Clone, Default)]
pub struct OccupancySink {
    solutions: u64,
    weeks: BTreeMap<String, BTreeMap<i64, u64>>,
}

impl OccupancySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn solutions(&self) -> u64 {
        self.solutions
    }

    /// Week -> number of solutions occupying it, for one section.
    pub fn occupancy(&self, section: &str) -> Option<&BTreeMap<i64, u64>> {
        self.weeks.get(section)
    }

    /// Fraction of solutions that place `section` in `week`.
    pub fn share(&self, section: &str, week: i64) -> f64 {
        if self.solutions == 0 {
            return 0.0;
        }
        let hits = self
            .occupancy(section)
            .and_then(|w| w.get(&week))
            .copied()
            .unwrap_or(0);
        hits as f64 / self.solutions as f64
    }

    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.weeks.keys().map(String::as_str)
    }
}

impl SolutionSink for OccupancySink {
    fn accept(&mut self, record: &SolutionRecord) {
        self.solutions += 1;
        for section in record {
            let weeks = self.weeks.entry(section.name.clone()).or_default();
            for week in section.start_week..section.end_week {
                *weeks.entry(week).or_default() += 1;
            }
        }
    }
}
