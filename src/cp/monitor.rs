//! Search monitors.
//!
//! A monitor observes the depth-first search and may ask it to stop. The
//! solver consults monitors at every node, so `check_termination` must be
//! cheap; monitors that read the clock only do so every few nodes.

use super::model::CpModel;
use super::stats::SearchStatistics;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// Why an enumeration ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TerminationReason {
    /// The whole search space was explored.
    Exhausted,
    /// The wall-clock budget ran out.
    TimeLimit,
    /// The configured number of solutions was reached.
    SolutionLimit,
    /// An external cancellation flag was raised.
    Interrupted,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationReason::Exhausted => write!(f, "search space exhausted"),
            TerminationReason::TimeLimit => write!(f, "time limit reached"),
            TerminationReason::SolutionLimit => write!(f, "solution limit reached"),
            TerminationReason::Interrupted => write!(f, "interrupted"),
        }
    }
}

/// Command returned by a monitor to control the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchCommand {
    /// Keep searching.
    Continue,
    /// Stop the search for the given reason.
    Terminate(TerminationReason),
}

/// Trait for monitoring and controlling the search process.
pub trait SearchMonitor {
    fn name(&self) -> &str;

    /// Called once before the search begins.
    fn on_enter_search(&mut self, _model: &CpModel) {}

    /// Called at every search node, before it is expanded.
    fn check_termination(&mut self, _stats: &SearchStatistics) -> SearchCommand {
        SearchCommand::Continue
    }

    /// Called after each solution has been handed to the caller.
    fn on_solution(&mut self, _stats: &SearchStatistics) {}

    /// Called once after the search ends.
    fn on_exit_search(&mut self, _stats: &SearchStatistics) {}
}

/// A monitor that never intervenes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMonitor;

impl SearchMonitor for NoOpMonitor {
    fn name(&self) -> &str {
        "NoOpMonitor"
    }
}

/// Terminates the search after a wall-clock duration.
///
/// Checks the clock only every `check_interval` nodes.
#[derive(Debug, Clone)]
pub struct TimeLimitMonitor {
    time_limit: Duration,
    start_time: Option<Instant>,
    check_interval: u64,
    ops_since_last_check: u64,
}

impl TimeLimitMonitor {
    pub fn new(time_limit: Duration, check_interval: u64) -> Self {
        Self {
            time_limit,
            start_time: None,
            check_interval: check_interval.max(1),
            ops_since_last_check: 0,
        }
    }

    /// Checks the clock every 1024 nodes.
    pub fn with_default_check_interval(time_limit: Duration) -> Self {
        Self::new(time_limit, 1024)
    }
}

impl SearchMonitor for TimeLimitMonitor {
    fn name(&self) -> &str {
        "TimeLimitMonitor"
    }

    fn on_enter_search(&mut self, _model: &CpModel) {
        self.start_time = Some(Instant::now());
        self.ops_since_last_check = 0;
    }

    fn check_termination(&mut self, _stats: &SearchStatistics) -> SearchCommand {
        self.ops_since_last_check = self.ops_since_last_check.saturating_add(1);
        if self.ops_since_last_check >= self.check_interval {
            self.ops_since_last_check = 0;
            if self
                .start_time
                .is_some_and(|start| start.elapsed() >= self.time_limit)
            {
                return SearchCommand::Terminate(TerminationReason::TimeLimit);
            }
        }
        SearchCommand::Continue
    }

    fn on_exit_search(&mut self, _stats: &SearchStatistics) {
        self.start_time = None;
    }
}

/// Terminates the search once `limit` solutions have been surfaced.
#[derive(Debug, Clone)]
pub struct SolutionLimitMonitor {
    limit: u64,
}

impl SolutionLimitMonitor {
    pub fn new(limit: u64) -> Self {
        Self { limit }
    }
}

impl SearchMonitor for SolutionLimitMonitor {
    fn name(&self) -> &str {
        "SolutionLimitMonitor"
    }

    fn check_termination(&mut self, stats: &SearchStatistics) -> SearchCommand {
        if stats.solutions_found >= self.limit {
            SearchCommand::Terminate(TerminationReason::SolutionLimit)
        } else {
            SearchCommand::Continue
        }
    }
}

/// Terminates the search when a shared flag is raised.
#[derive(Debug, Clone)]
pub struct InterruptMonitor {
    flag: Arc<AtomicBool>,
}

impl InterruptMonitor {
    pub fn new(flag: Arc<AtomicBool>) -> Self {
        Self { flag }
    }
}

impl SearchMonitor for InterruptMonitor {
    fn name(&self) -> &str {
        "InterruptMonitor"
    }

    fn check_termination(&mut self, _stats: &SearchStatistics) -> SearchCommand {
        if self.flag.load(Ordering::Relaxed) {
            SearchCommand::Terminate(TerminationReason::Interrupted)
        } else {
            SearchCommand::Continue
        }
    }
}

/// Logs a progress line every `interval` solutions.
#[derive(Debug, Clone)]
pub struct ProgressMonitor {
    interval: u64,
    start_time: Instant,
}

impl ProgressMonitor {
    pub fn new(interval: u64) -> Self {
        Self {
            interval: interval.max(1),
            start_time: Instant::now(),
        }
    }
}

impl SearchMonitor for ProgressMonitor {
    fn name(&self) -> &str {
        "ProgressMonitor"
    }

    fn on_enter_search(&mut self, _model: &CpModel) {
        self.start_time = Instant::now();
    }

    fn on_solution(&mut self, stats: &SearchStatistics) {
        if stats.solutions_found % self.interval == 0 {
            info!(
                solutions = stats.solutions_found,
                nodes = stats.nodes_explored,
                elapsed_s = self.start_time.elapsed().as_secs_f64(),
                "solutions so far"
            );
        }
    }
}

/// Fans every callback out to a list of monitors.
///
/// `check_termination` returns the first `Terminate` in insertion order.
#[derive(Default)]
pub struct CompositeMonitor {
    monitors: Vec<Box<dyn SearchMonitor + Send>>,
}

impl CompositeMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_monitor(&mut self, monitor: Box<dyn SearchMonitor + Send>) {
        self.monitors.push(monitor);
    }

    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }
}

impl fmt::Debug for CompositeMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.monitors.iter().map(|m| m.name()))
            .finish()
    }
}

impl SearchMonitor for CompositeMonitor {
    fn name(&self) -> &str {
        "CompositeMonitor"
    }

    fn on_enter_search(&mut self, model: &CpModel) {
        for m in &mut self.monitors {
            m.on_enter_search(model);
        }
    }

    fn check_termination(&mut self, stats: &SearchStatistics) -> SearchCommand {
        for m in &mut self.monitors {
            if let SearchCommand::Terminate(reason) = m.check_termination(stats) {
                return SearchCommand::Terminate(reason);
            }
        }
        SearchCommand::Continue
    }

    fn on_solution(&mut self, stats: &SearchStatistics) {
        for m in &mut self.monitors {
            m.on_solution(stats);
        }
    }

    fn on_exit_search(&mut self, stats: &SearchStatistics) {
        for m in &mut self.monitors {
            m.on_exit_search(stats);
        }
    }
}
