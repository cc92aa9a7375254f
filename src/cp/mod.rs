//! Constraint Programming (CP) framework.
//!
//! A small finite-domain model over fixed-duration intervals, plus a
//! single-worker depth-first solver that enumerates *every* satisfying
//! assignment.
//!
//! # Key Components
//!
//! - **Variables**: [`IntervalVar`] with a finite start [`Domain`]
//! - **Constraints**: [`Constraint`] — NoOverlap, Contiguous, AllowedTimes,
//!   Adjacent, NotAdjacent
//! - **Model**: [`CpModel`] — container for variables and constraints
//! - **Solver**: [`CpSolver`] trait and [`DepthFirstSolver`]
//! - **Monitors**: [`SearchMonitor`] — time/solution limits, interrupts,
//!   progress logging
//!
//! # Design
//!
//! There is no objective. Solvers stream each solution to a callback and
//! never buffer the solution set, so enumeration of very large spaces runs
//! in bounded memory. Search is single-threaded with a fixed decision
//! order, which makes emission order and solution count reproducible.
//!
//! # References
//!
//! Rossi, van Beek & Walsh (2006), "Handbook of Constraint Programming"

mod model;
mod monitor;
mod search;
mod solver;
mod stats;
mod trail;
mod variables;

pub use model::{Constraint, CpModel, ModelError, Violation};
pub use monitor::{
    CompositeMonitor, InterruptMonitor, NoOpMonitor, ProgressMonitor, SearchCommand,
    SearchMonitor, SolutionLimitMonitor, TerminationReason, TimeLimitMonitor,
};
pub use solver::{
    Assignment, Branching, CpError, CpSolver, DepthFirstSolver, SearchOutcome, SolverConfig,
    SolverStatus, ValueOrder,
};
pub use stats::SearchStatistics;
pub use variables::{Domain, IntervalId, IntervalVar};
