//! CP model definition.

use super::variables::{IntervalId, IntervalVar};
use std::collections::BTreeSet;
use thiserror::Error;

/// A constraint in the CP model.
///
/// All constraints are over fixed-duration intervals. Time is a plain
/// integer axis; intervals are half-open, so two intervals touch when one
/// ends exactly where the other starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// No two intervals in the set may overlap in time.
    NoOverlap {
        intervals: Vec<IntervalId>,
    },

    /// The intervals tile `[origin, origin + sum(durations))` exactly:
    /// no overlap, no idle time, nothing outside the span.
    Contiguous {
        intervals: Vec<IntervalId>,
        origin: i64,
    },

    /// Every time unit covered by the interval must be in `times`.
    ///
    /// Checked per covered unit, so a set with internal gaps rejects an
    /// interval straddling a gap even when both of its endpoints are
    /// allowed.
    AllowedTimes {
        interval: IntervalId,
        times: BTreeSet<i64>,
    },

    /// `a` and `b` share a boundary: `a.start == b.end` or `a.end == b.start`.
    Adjacent { a: IntervalId, b: IntervalId },

    /// `a` and `b` do not share a boundary.
    NotAdjacent { a: IntervalId, b: IntervalId },
}

impl Constraint {
    /// Short constraint kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Constraint::NoOverlap { .. } => "no-overlap",
            Constraint::Contiguous { .. } => "contiguous",
            Constraint::AllowedTimes { .. } => "allowed-times",
            Constraint::Adjacent { .. } => "adjacent",
            Constraint::NotAdjacent { .. } => "not-adjacent",
        }
    }
}

/// Structural problems in a [`CpModel`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("undefined interval: {0}")]
    UnknownInterval(usize),

    #[error("{0} constraint has no intervals")]
    EmptyConstraint(&'static str),

    #[error("{kind} constraint relates interval {interval} to itself")]
    SelfReference { kind: &'static str, interval: usize },

    #[error("interval {interval} has non-positive duration {duration}")]
    NonPositiveDuration { interval: usize, duration: i64 },

    #[error("chronological branching needs one contiguous constraint over every interval")]
    ChronologicalWithoutContiguous,
}

/// A constraint violated by a complete assignment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("assignment has {got} starts for {expected} intervals")]
    Arity { expected: usize, got: usize },

    #[error("interval {interval} starts at {start}, outside its domain")]
    OutOfDomain { interval: usize, start: i64 },

    #[error("intervals {a} and {b} overlap")]
    Overlap { a: usize, b: usize },

    #[error("contiguous span broken at time {at}")]
    Gap { at: i64 },

    #[error("interval {interval} covers disallowed time {time}")]
    Disallowed { interval: usize, time: i64 },

    #[error("intervals {a} and {b} must be adjacent")]
    NotAdjacent { a: usize, b: usize },

    #[error("intervals {a} and {b} must not be adjacent")]
    Adjacent { a: usize, b: usize },
}

/// A constraint programming model.
///
/// Contains interval variables and constraints. There is no objective:
/// solvers enumerate every satisfying assignment.
///
/// # Examples
///
/// ```
/// use u_itinerary::cp::{CpModel, IntervalVar};
///
/// let mut model = CpModel::new("example");
/// let a = model.add_interval(IntervalVar::new("a", 0, 10, 4));
/// let b = model.add_interval(IntervalVar::new("b", 0, 10, 6));
/// model.add_contiguous(vec![a, b], 0);
/// model.add_adjacent(a, b);
/// assert!(model.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct CpModel {
    /// Model name.
    pub name: String,
    intervals: Vec<IntervalVar>,
    constraints: Vec<Constraint>,
}

impl CpModel {
    /// Creates a new empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            intervals: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// Adds an interval variable and returns its id.
    pub fn add_interval(&mut self, var: IntervalVar) -> IntervalId {
        self.intervals.push(var);
        IntervalId::new(self.intervals.len() - 1)
    }

    /// Adds a constraint.
    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    pub fn add_no_overlap(&mut self, intervals: Vec<IntervalId>) {
        self.constraints.push(Constraint::NoOverlap { intervals });
    }

    pub fn add_contiguous(&mut self, intervals: Vec<IntervalId>, origin: i64) {
        self.constraints
            .push(Constraint::Contiguous { intervals, origin });
    }

    pub fn add_allowed_times(&mut self, interval: IntervalId, times: BTreeSet<i64>) {
        self.constraints
            .push(Constraint::AllowedTimes { interval, times });
    }

    pub fn add_adjacent(&mut self, a: IntervalId, b: IntervalId) {
        self.constraints.push(Constraint::Adjacent { a, b });
    }

    pub fn add_not_adjacent(&mut self, a: IntervalId, b: IntervalId) {
        self.constraints.push(Constraint::NotAdjacent { a, b });
    }

    pub fn interval(&self, id: IntervalId) -> &IntervalVar {
        &self.intervals[id.get()]
    }

    pub fn intervals(&self) -> &[IntervalVar] {
        &self.intervals
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Returns the number of interval variables.
    pub fn interval_count(&self) -> usize {
        self.intervals.len()
    }

    /// Returns the number of constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// The first contiguous constraint, if any.
    pub fn contiguous(&self) -> Option<(&[IntervalId], i64)> {
        self.constraints.iter().find_map(|c| match c {
            Constraint::Contiguous { intervals, origin } => Some((intervals.as_slice(), *origin)),
            _ => None,
        })
    }

    /// Whether one contiguous constraint covers every interval.
    pub fn is_fully_contiguous(&self) -> bool {
        self.contiguous().is_some_and(|(ids, _)| {
            let mut seen = vec![false; self.intervals.len()];
            for id in ids {
                if let Some(slot) = seen.get_mut(id.get()) {
                    *slot = true;
                }
            }
            seen.into_iter().all(|s| s)
        })
    }

    /// Validates the model for consistency.
    ///
    /// Checks that every referenced interval exists, that group
    /// constraints are non-empty, that binary constraints relate two
    /// distinct intervals and that durations are positive.
    pub fn validate(&self) -> Result<(), ModelError> {
        for (i, var) in self.intervals.iter().enumerate() {
            if var.duration <= 0 {
                return Err(ModelError::NonPositiveDuration {
                    interval: i,
                    duration: var.duration,
                });
            }
        }

        for constraint in &self.constraints {
            match constraint {
                Constraint::NoOverlap { intervals } | Constraint::Contiguous { intervals, .. } => {
                    if intervals.is_empty() {
                        return Err(ModelError::EmptyConstraint(constraint.kind()));
                    }
                    for id in intervals {
                        self.check_id(*id)?;
                    }
                }
                Constraint::AllowedTimes { interval, .. } => self.check_id(*interval)?,
                Constraint::Adjacent { a, b } | Constraint::NotAdjacent { a, b } => {
                    self.check_id(*a)?;
                    self.check_id(*b)?;
                    if a == b {
                        return Err(ModelError::SelfReference {
                            kind: constraint.kind(),
                            interval: a.get(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn check_id(&self, id: IntervalId) -> Result<(), ModelError> {
        if id.get() >= self.intervals.len() {
            return Err(ModelError::UnknownInterval(id.get()));
        }
        Ok(())
    }

    /// Checks a complete assignment of start values against every
    /// domain and constraint.
    ///
    /// `starts[i]` is the start of interval `i`.
    pub fn check(&self, starts: &[i64]) -> Result<(), Violation> {
        if starts.len() != self.intervals.len() {
            return Err(Violation::Arity {
                expected: self.intervals.len(),
                got: starts.len(),
            });
        }
        for (i, (var, &start)) in self.intervals.iter().zip(starts).enumerate() {
            if !var.start.contains(start) {
                return Err(Violation::OutOfDomain { interval: i, start });
            }
        }

        let span = |id: &IntervalId| {
            let s = starts[id.get()];
            (s, s + self.intervals[id.get()].duration)
        };

        for constraint in &self.constraints {
            match constraint {
                Constraint::NoOverlap { intervals } => {
                    for (x, a) in intervals.iter().enumerate() {
                        for b in &intervals[x + 1..] {
                            let (sa, ea) = span(a);
                            let (sb, eb) = span(b);
                            if sa < eb && sb < ea {
                                return Err(Violation::Overlap {
                                    a: a.get(),
                                    b: b.get(),
                                });
                            }
                        }
                    }
                }
                Constraint::Contiguous { intervals, origin } => {
                    let mut spans: Vec<(i64, i64)> = intervals.iter().map(span).collect();
                    spans.sort_unstable();
                    let mut cursor = *origin;
                    for (s, e) in spans {
                        if s != cursor {
                            return Err(Violation::Gap { at: cursor.min(s) });
                        }
                        cursor = e;
                    }
                }
                Constraint::AllowedTimes { interval, times } => {
                    let (s, e) = span(interval);
                    if let Some(time) = (s..e).find(|t| !times.contains(t)) {
                        return Err(Violation::Disallowed {
                            interval: interval.get(),
                            time,
                        });
                    }
                }
                Constraint::Adjacent { a, b } => {
                    let (sa, ea) = span(a);
                    let (sb, eb) = span(b);
                    if sa != eb && ea != sb {
                        return Err(Violation::NotAdjacent {
                            a: a.get(),
                            b: b.get(),
                        });
                    }
                }
                Constraint::NotAdjacent { a, b } => {
                    let (sa, ea) = span(a);
                    let (sb, eb) = span(b);
                    if sa == eb || ea == sb {
                        return Err(Violation::Adjacent {
                            a: a.get(),
                            b: b.get(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}
