//! CP solver interface and the depth-first enumerating solver.

use super::model::{CpModel, ModelError};
use super::monitor::{
    CompositeMonitor, NoOpMonitor, ProgressMonitor, SearchMonitor, SolutionLimitMonitor,
    TerminationReason, TimeLimitMonitor,
};
use super::search::{Branch, Search};
use super::stats::SearchStatistics;
use super::trail::SearchTrail;
use super::variables::IntervalId;
use std::fmt;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

/// Status of the solver after an enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolverStatus {
    /// The search space was exhausted: every solution has been emitted.
    Optimal,
    /// The search stopped early after emitting at least one solution.
    Feasible,
    /// The search space was exhausted without a single solution.
    Infeasible,
    /// The search stopped early before any solution was found.
    Unknown,
}

impl SolverStatus {
    /// Derives the status from how the search ended and what it found.
    pub fn from_search(termination: TerminationReason, solutions_found: u64) -> Self {
        match (termination, solutions_found) {
            (TerminationReason::Exhausted, 0) => SolverStatus::Infeasible,
            (TerminationReason::Exhausted, _) => SolverStatus::Optimal,
            (_, 0) => SolverStatus::Unknown,
            (_, _) => SolverStatus::Feasible,
        }
    }

    /// Whether at least one solution was emitted.
    pub fn is_solution_found(self) -> bool {
        matches!(self, SolverStatus::Optimal | SolverStatus::Feasible)
    }

    /// Whether the search explored the whole space.
    pub fn is_complete(self) -> bool {
        matches!(self, SolverStatus::Optimal | SolverStatus::Infeasible)
    }
}

impl fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SolverStatus::Optimal => "OPTIMAL",
            SolverStatus::Feasible => "FEASIBLE",
            SolverStatus::Infeasible => "INFEASIBLE",
            SolverStatus::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// Variable selection strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Branching {
    /// Chronological when the model is fully contiguous, first-fail
    /// otherwise.
    #[default]
    Auto,
    /// Fill the earliest uncovered time unit next. Requires one contiguous
    /// constraint over every interval.
    Chronological,
    /// Branch on the unassigned interval with the fewest remaining starts.
    FirstFail,
}

/// Order in which the values of a decision are tried.
///
/// The order changes emission order only; the emitted set is the same.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValueOrder {
    #[default]
    Ascending,
    /// Seeded shuffle of each node's decisions.
    Shuffled { seed: u64 },
}

/// Solver configuration.
///
/// # Examples
///
/// ```
/// use u_itinerary::cp::{Branching, SolverConfig};
///
/// let config = SolverConfig::default()
///     .with_time_limit_ms(30_000)
///     .with_solution_limit(10_000)
///     .with_branching(Branching::FirstFail);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverConfig {
    /// Wall-clock budget in milliseconds. `None` = no limit.
    pub time_limit_ms: Option<u64>,
    /// Stop after this many solutions. `None` = enumerate everything.
    pub solution_limit: Option<u64>,
    /// Number of search workers. Must be 1: emission order and solution
    /// count are only reproducible with a single worker.
    pub num_workers: usize,
    /// Variable selection strategy.
    pub branching: Branching,
    /// Value ordering within a decision.
    pub value_order: ValueOrder,
    /// Log progress every this many solutions. 0 = off.
    pub progress_interval: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit_ms: None,
            solution_limit: None,
            num_workers: 1,
            branching: Branching::Auto,
            value_order: ValueOrder::Ascending,
            progress_interval: 5000,
        }
    }
}

impl SolverConfig {
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    pub fn with_solution_limit(mut self, n: u64) -> Self {
        self.solution_limit = Some(n);
        self
    }

    pub fn with_num_workers(mut self, n: usize) -> Self {
        self.num_workers = n;
        self
    }

    pub fn with_branching(mut self, branching: Branching) -> Self {
        self.branching = branching;
        self
    }

    pub fn with_value_order(mut self, order: ValueOrder) -> Self {
        self.value_order = order;
        self
    }

    pub fn with_progress_interval(mut self, n: u64) -> Self {
        self.progress_interval = n;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.num_workers != 1 {
            return Err(format!(
                "num_workers must be 1 for reproducible enumeration, got {}",
                self.num_workers
            ));
        }
        if self.time_limit_ms == Some(0) {
            return Err("time_limit_ms must be positive".into());
        }
        if self.solution_limit == Some(0) {
            return Err("solution_limit must be positive".into());
        }
        Ok(())
    }

    /// Monitors implied by the limits in this configuration.
    pub fn monitors(&self) -> CompositeMonitor {
        let mut monitors = CompositeMonitor::new();
        if let Some(ms) = self.time_limit_ms {
            monitors.add_monitor(Box::new(TimeLimitMonitor::with_default_check_interval(
                Duration::from_millis(ms),
            )));
        }
        if let Some(n) = self.solution_limit {
            monitors.add_monitor(Box::new(SolutionLimitMonitor::new(n)));
        }
        if self.progress_interval > 0 {
            monitors.add_monitor(Box::new(ProgressMonitor::new(self.progress_interval)));
        }
        monitors
    }
}

/// A complete assignment handed to the solution callback.
///
/// Borrowed from the solver; copy out what you need before returning.
#[derive(Debug, Clone, Copy)]
pub struct Assignment<'a> {
    model: &'a CpModel,
    starts: &'a [i64],
}

impl<'a> Assignment<'a> {
    pub(crate) fn new(model: &'a CpModel, starts: &'a [i64]) -> Self {
        Self { model, starts }
    }

    pub fn start(&self, id: IntervalId) -> i64 {
        self.starts[id.get()]
    }

    pub fn end(&self, id: IntervalId) -> i64 {
        self.starts[id.get()] + self.model.interval(id).duration
    }

    /// Start values indexed by interval.
    pub fn starts(&self) -> &'a [i64] {
        self.starts
    }

    pub fn model(&self) -> &'a CpModel {
        self.model
    }
}

/// Result of an enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    pub status: SolverStatus,
    pub termination: TerminationReason,
    pub statistics: SearchStatistics,
}

impl SearchOutcome {
    pub fn solutions_found(&self) -> u64 {
        self.statistics.solutions_found
    }
}

/// Errors raised before any search starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CpError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("invalid solver configuration: {0}")]
    Config(String),
}

/// Trait for enumerating solvers.
///
/// Implementors call `on_solution` once per satisfying assignment, in
/// search order, and never buffer the solution set.
pub trait CpSolver {
    /// Enumerates every solution, with an extra caller-supplied monitor.
    fn enumerate_with_monitor(
        &mut self,
        model: &CpModel,
        config: &SolverConfig,
        monitor: &mut dyn SearchMonitor,
        on_solution: &mut dyn FnMut(&Assignment<'_>),
    ) -> Result<SearchOutcome, CpError>;

    /// Enumerates every solution.
    fn enumerate(
        &mut self,
        model: &CpModel,
        config: &SolverConfig,
        on_solution: &mut dyn FnMut(&Assignment<'_>),
    ) -> Result<SearchOutcome, CpError> {
        self.enumerate_with_monitor(model, config, &mut NoOpMonitor, on_solution)
    }
}

/// Single-worker depth-first search with forward checking.
///
/// Unary constraints (allowed times, the contiguous span) are applied to
/// the domains once at the root. Binary relations (no-overlap,
/// adjacency) are propagated to the unassigned partner after every
/// decision, and every leaf is re-checked with [`CpModel::check`] before
/// it is surfaced. The trail is kept between runs to reuse its buffers.
#[derive(Debug, Default)]
pub struct DepthFirstSolver {
    trail: SearchTrail,
}

impl DepthFirstSolver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CpSolver for DepthFirstSolver {
    fn enumerate_with_monitor(
        &mut self,
        model: &CpModel,
        config: &SolverConfig,
        monitor: &mut dyn SearchMonitor,
        on_solution: &mut dyn FnMut(&Assignment<'_>),
    ) -> Result<SearchOutcome, CpError> {
        config.validate().map_err(CpError::Config)?;
        model.validate()?;
        let branch = resolve_branching(model, config.branching)?;

        let start_time = Instant::now();
        let mut limits = config.monitors();
        limits.on_enter_search(model);
        monitor.on_enter_search(model);

        self.trail.clear();
        self.trail.ensure_capacity(model.interval_count());

        let (termination, mut statistics) = {
            let mut search = Search::new(
                model,
                branch,
                config.value_order,
                &mut self.trail,
                &mut limits,
                &mut *monitor,
                &mut *on_solution,
            );
            let termination = search.run();
            (termination, search.into_statistics())
        };
        debug_assert_eq!(self.trail.depth(), 0);
        statistics.set_total_time(start_time.elapsed());

        limits.on_exit_search(&statistics);
        monitor.on_exit_search(&statistics);

        let status = SolverStatus::from_search(termination, statistics.solutions_found);
        debug!(model = %model.name, %status, %termination, %statistics, "enumeration finished");

        Ok(SearchOutcome {
            status,
            termination,
            statistics,
        })
    }
}

fn resolve_branching(model: &CpModel, branching: Branching) -> Result<Branch, ModelError> {
    let chronological = || {
        model
            .contiguous()
            .filter(|_| model.is_fully_contiguous())
            .map(|(_, origin)| Branch::Chronological { origin })
    };
    match branching {
        Branching::Auto => Ok(chronological().unwrap_or(Branch::FirstFail)),
        Branching::Chronological => {
            chronological().ok_or(ModelError::ChronologicalWithoutContiguous)
        }
        Branching::FirstFail => Ok(Branch::FirstFail),
    }
}
