//! Depth-first search state.

use super::model::{Constraint, CpModel};
use super::monitor::{CompositeMonitor, SearchCommand, SearchMonitor, TerminationReason};
use super::solver::{Assignment, ValueOrder};
use super::stats::SearchStatistics;
use super::trail::{SearchTrail, TrailEntry};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, warn};

/// Resolved branching strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Branch {
    /// Next decision places some interval at `origin + assigned weeks`.
    Chronological { origin: i64 },
    FirstFail,
}

/// Binary relation between two intervals `[s, e)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Relation {
    Disjoint,
    Adjacent,
    Apart,
}

impl Relation {
    #[inline]
    fn holds(self, (sa, ea): (i64, i64), (sb, eb): (i64, i64)) -> bool {
        match self {
            Relation::Disjoint => ea <= sb || eb <= sa,
            Relation::Adjacent => sa == eb || ea == sb,
            Relation::Apart => sa != eb && ea != sb,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Link {
    other: usize,
    relation: Relation,
}

/// A domain whose values are switched off and on instead of removed.
#[derive(Debug, Clone)]
struct LiveDomain {
    values: Vec<i64>,
    alive: Vec<bool>,
    size: usize,
}

impl LiveDomain {
    fn new(values: Vec<i64>) -> Self {
        let size = values.len();
        Self {
            alive: vec![true; size],
            values,
            size,
        }
    }

    #[inline]
    fn contains(&self, value: i64) -> bool {
        self.values
            .binary_search(&value)
            .is_ok_and(|slot| self.alive[slot])
    }

    fn alive_values(&self) -> impl Iterator<Item = i64> + '_ {
        self.values
            .iter()
            .zip(&self.alive)
            .filter(|(_, &alive)| alive)
            .map(|(&v, _)| v)
    }
}

pub(crate) struct Search<'a, M, F>
where
    M: SearchMonitor + ?Sized,
    F: FnMut(&Assignment<'_>) + ?Sized,
{
    model: &'a CpModel,
    branch: Branch,
    rng: Option<StdRng>,
    durations: Vec<i64>,
    domains: Vec<LiveDomain>,
    assigned: Vec<Option<i64>>,
    num_assigned: usize,
    assigned_span: i64,
    links: Vec<Vec<Link>>,
    starts: Vec<i64>,
    trail: &'a mut SearchTrail,
    limits: &'a mut CompositeMonitor,
    monitor: &'a mut M,
    on_solution: &'a mut F,
    stats: SearchStatistics,
}

impl<'a, M, F> Search<'a, M, F>
where
    M: SearchMonitor + ?Sized,
    F: FnMut(&Assignment<'_>) + ?Sized,
{
    pub(crate) fn new(
        model: &'a CpModel,
        branch: Branch,
        value_order: ValueOrder,
        trail: &'a mut SearchTrail,
        limits: &'a mut CompositeMonitor,
        monitor: &'a mut M,
        on_solution: &'a mut F,
    ) -> Self {
        let n = model.interval_count();
        let durations: Vec<i64> = model.intervals().iter().map(|v| v.duration).collect();
        let domains = root_domains(model, &durations)
            .into_iter()
            .map(LiveDomain::new)
            .collect();
        let rng = match value_order {
            ValueOrder::Ascending => None,
            ValueOrder::Shuffled { seed } => Some(StdRng::seed_from_u64(seed)),
        };

        Self {
            model,
            branch,
            rng,
            durations,
            domains,
            assigned: vec![None; n],
            num_assigned: 0,
            assigned_span: 0,
            links: build_links(model),
            starts: Vec::with_capacity(n),
            trail,
            limits,
            monitor,
            on_solution,
            stats: SearchStatistics::default(),
        }
    }

    /// Runs the search to completion or until a monitor stops it.
    pub(crate) fn run(&mut self) -> TerminationReason {
        if let Some(var) = self.domains.iter().position(|d| d.size == 0) {
            debug!(
                interval = %self.model.intervals()[var].name,
                "empty domain after root filtering"
            );
            return TerminationReason::Exhausted;
        }
        match self.search(0) {
            SearchCommand::Continue => TerminationReason::Exhausted,
            SearchCommand::Terminate(reason) => reason,
        }
    }

    pub(crate) fn into_statistics(self) -> SearchStatistics {
        self.stats
    }

    fn search(&mut self, depth: u64) -> SearchCommand {
        self.stats.on_node_explored();
        self.stats.on_depth_update(depth);

        let command = self.check_termination();
        if command != SearchCommand::Continue {
            return command;
        }

        if self.num_assigned == self.durations.len() {
            self.emit();
            return SearchCommand::Continue;
        }

        for (var, value) in self.decisions() {
            self.stats.on_decision_generated();
            self.trail.push_frame();
            let command = if self.assign(var, value) {
                self.search(depth + 1)
            } else {
                self.stats.on_pruning_infeasible();
                SearchCommand::Continue
            };
            self.undo();
            self.stats.on_backtrack();
            if command != SearchCommand::Continue {
                return command;
            }
        }
        SearchCommand::Continue
    }

    fn check_termination(&mut self) -> SearchCommand {
        match self.limits.check_termination(&self.stats) {
            SearchCommand::Continue => self.monitor.check_termination(&self.stats),
            stop => stop,
        }
    }

    /// Candidate `(interval, start)` pairs for the current node.
    fn decisions(&mut self) -> Vec<(usize, i64)> {
        let unassigned = |var: &usize| self.assigned[*var].is_none();
        let mut decisions: Vec<(usize, i64)> = match self.branch {
            Branch::Chronological { origin } => {
                let frontier = origin + self.assigned_span;
                (0..self.durations.len())
                    .filter(unassigned)
                    .filter(|&var| self.domains[var].contains(frontier))
                    .map(|var| (var, frontier))
                    .collect()
            }
            Branch::FirstFail => (0..self.durations.len())
                .filter(unassigned)
                .min_by_key(|&var| (self.domains[var].size, var))
                .map(|var| {
                    self.domains[var]
                        .alive_values()
                        .map(|value| (var, value))
                        .collect()
                })
                .unwrap_or_default(),
        };
        if let Some(rng) = self.rng.as_mut() {
            decisions.shuffle(rng);
        }
        decisions
    }

    /// Assigns `var = value` and forward-checks every linked interval.
    ///
    /// Returns `false` when a relation with an assigned interval fails or a
    /// linked domain empties. Changes are on the trail either way.
    fn assign(&mut self, var: usize, value: i64) -> bool {
        self.trail.push(TrailEntry::Assigned { var });
        self.assigned[var] = Some(value);
        self.num_assigned += 1;
        self.assigned_span += self.durations[var];

        let span = (value, value + self.durations[var]);
        for link in &self.links[var] {
            let other = link.other;
            let duration = self.durations[other];
            match self.assigned[other] {
                Some(start) => {
                    if !link.relation.holds(span, (start, start + duration)) {
                        return false;
                    }
                }
                None => {
                    let domain = &mut self.domains[other];
                    for slot in 0..domain.values.len() {
                        if !domain.alive[slot] {
                            continue;
                        }
                        let start = domain.values[slot];
                        if !link.relation.holds(span, (start, start + duration)) {
                            domain.alive[slot] = false;
                            domain.size -= 1;
                            self.trail.push(TrailEntry::Removed { var: other, slot });
                        }
                    }
                    if domain.size == 0 {
                        return false;
                    }
                }
            }
        }
        true
    }

    fn undo(&mut self) {
        for entry in self.trail.pop_frame() {
            match entry {
                TrailEntry::Removed { var, slot } => {
                    let domain = &mut self.domains[var];
                    domain.alive[slot] = true;
                    domain.size += 1;
                }
                TrailEntry::Assigned { var } => {
                    self.assigned[var] = None;
                    self.num_assigned -= 1;
                    self.assigned_span -= self.durations[var];
                }
            }
        }
    }

    fn emit(&mut self) {
        self.starts.clear();
        self.starts.extend(self.assigned.iter().flatten());
        if let Err(violation) = self.model.check(&self.starts) {
            warn!(%violation, model = %self.model.name, "discarding assignment that fails the final check");
            return;
        }
        self.stats.on_solution_found();
        (self.on_solution)(&Assignment::new(self.model, &self.starts));
        self.limits.on_solution(&self.stats);
        self.monitor.on_solution(&self.stats);
    }
}

/// Start domains after the unary constraints have been applied.
fn root_domains(model: &CpModel, durations: &[i64]) -> Vec<Vec<i64>> {
    let mut domains: Vec<Vec<i64>> = model
        .intervals()
        .iter()
        .map(|v| v.start.values().to_vec())
        .collect();

    for constraint in model.constraints() {
        match constraint {
            Constraint::AllowedTimes { interval, times } => {
                let d = durations[interval.get()];
                domains[interval.get()].retain(|&s| (s..s + d).all(|t| times.contains(&t)));
            }
            Constraint::Contiguous { intervals, origin } => {
                let total: i64 = intervals.iter().map(|id| durations[id.get()]).sum();
                for id in intervals {
                    let d = durations[id.get()];
                    domains[id.get()].retain(|&s| s >= *origin && s + d <= origin + total);
                }
            }
            _ => {}
        }
    }
    domains
}

/// Per-interval list of binary relations to propagate on assignment.
fn build_links(model: &CpModel) -> Vec<Vec<Link>> {
    let mut links = vec![Vec::new(); model.interval_count()];
    let mut relate = |a: usize, b: usize, relation: Relation| {
        if a != b {
            links[a].push(Link { other: b, relation });
            links[b].push(Link { other: a, relation });
        }
    };

    for constraint in model.constraints() {
        match constraint {
            Constraint::NoOverlap { intervals } | Constraint::Contiguous { intervals, .. } => {
                for (x, a) in intervals.iter().enumerate() {
                    for b in &intervals[x + 1..] {
                        relate(a.get(), b.get(), Relation::Disjoint);
                    }
                }
            }
            Constraint::Adjacent { a, b } => relate(a.get(), b.get(), Relation::Adjacent),
            Constraint::NotAdjacent { a, b } => relate(a.get(), b.get(), Relation::Apart),
            Constraint::AllowedTimes { .. } => {}
        }
    }

    for list in &mut links {
        list.sort_unstable();
        list.dedup();
    }
    links
}
