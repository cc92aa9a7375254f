//! Search statistics.

use std::fmt;
use std::time::Duration;

/// Counters collected during one enumeration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchStatistics {
    /// Total nodes visited.
    pub nodes_explored: u64,
    /// Decisions undone after their subtree was exhausted or failed.
    pub backtracks: u64,
    /// Total branching choices generated.
    pub decisions_generated: u64,
    /// The deepest level reached in the tree.
    pub max_depth: u64,
    /// Decisions rejected because propagation emptied a domain or broke
    /// a constraint between assigned intervals.
    pub prunings_infeasible: u64,
    /// Total solutions surfaced.
    pub solutions_found: u64,
    /// Wall-clock time spent in the solver.
    pub time_total: Duration,
}

impl SearchStatistics {
    #[inline]
    pub fn on_node_explored(&mut self) {
        self.nodes_explored = self.nodes_explored.saturating_add(1);
    }

    #[inline]
    pub fn on_backtrack(&mut self) {
        self.backtracks = self.backtracks.saturating_add(1);
    }

    #[inline]
    pub fn on_decision_generated(&mut self) {
        self.decisions_generated = self.decisions_generated.saturating_add(1);
    }

    #[inline]
    pub fn on_depth_update(&mut self, depth: u64) {
        self.max_depth = self.max_depth.max(depth);
    }

    #[inline]
    pub fn on_pruning_infeasible(&mut self) {
        self.prunings_infeasible = self.prunings_infeasible.saturating_add(1);
    }

    #[inline]
    pub fn on_solution_found(&mut self) {
        self.solutions_found = self.solutions_found.saturating_add(1);
    }

    #[inline]
    pub fn set_total_time(&mut self, duration: Duration) {
        self.time_total = duration;
    }
}

impl fmt::Display for SearchStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "nodes: {}, backtracks: {}, decisions: {}, max depth: {}, pruned: {}, solutions: {}, time: {:.3}s",
            self.nodes_explored,
            self.backtracks,
            self.decisions_generated,
            self.max_depth,
            self.prunings_infeasible,
            self.solutions_found,
            self.time_total.as_secs_f64()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let mut s = SearchStatistics::default();
        s.on_node_explored();
        s.on_node_explored();
        s.on_backtrack();
        s.on_decision_generated();
        s.on_pruning_infeasible();
        s.on_solution_found();
        s.on_depth_update(3);
        s.on_depth_update(1);
        assert_eq!(s.nodes_explored, 2);
        assert_eq!(s.backtracks, 1);
        assert_eq!(s.decisions_generated, 1);
        assert_eq!(s.prunings_infeasible, 1);
        assert_eq!(s.solutions_found, 1);
        assert_eq!(s.max_depth, 3);
    }

    #[test]
    fn test_saturates() {
        let mut s = SearchStatistics {
            nodes_explored: u64::MAX,
            ..Default::default()
        };
        s.on_node_explored();
        assert_eq!(s.nodes_explored, u64::MAX);
    }

    #[test]
    fn test_display() {
        let s = SearchStatistics {
            solutions_found: 2,
            ..Default::default()
        };
        assert!(s.to_string().contains("solutions: 2"));
    }
}
