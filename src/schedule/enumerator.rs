//! Exhaustive enumeration of a built schedule model.

use super::builder::ScheduleModel;
use super::sink::{CountingSink, SolutionSink};
use crate::cp::{
    Assignment, CpSolver, DepthFirstSolver, InterruptMonitor, NoOpMonitor, SearchMonitor,
    SearchStatistics, SolverConfig, SolverStatus, TerminationReason,
};
use crate::error::Result;
use std::fmt;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

/// Reported once when an enumeration ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumerationSummary {
    pub status: SolverStatus,
    /// Number of records handed to the sink.
    pub solution_count: u64,
    pub termination: TerminationReason,
    pub statistics: SearchStatistics,
}

impl fmt::Display for EnumerationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Status = {}, solutions found: {} ({})",
            self.status, self.solution_count, self.termination
        )
    }
}

/// Drives the depth-first solver over a [`ScheduleModel`] and streams every
/// solution to a [`SolutionSink`].
///
/// # Examples
///
/// ```
/// use u_itinerary::cp::{SolverConfig, SolverStatus};
/// use u_itinerary::schedule::{CollectingSink, Enumerator, ScheduleBuilder};
/// use u_itinerary::section::SectionSpec;
///
/// let model = ScheduleBuilder::new(1)
///     .section(SectionSpec::from_weeks("A", 1..11, 4).unwrap())
///     .section(SectionSpec::from_weeks("B", 1..11, 6).unwrap())
///     .build()
///     .unwrap();
///
/// let mut sink = CollectingSink::new();
/// let summary = Enumerator::new(SolverConfig::default())
///     .run(&model, &mut sink)
///     .unwrap();
/// assert_eq!(summary.status, SolverStatus::Optimal);
/// assert_eq!(sink.records().len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Enumerator {
    config: SolverConfig,
    cancel: Option<Arc<AtomicBool>>,
}

impl Enumerator {
    /// Creates an enumerator without a cancellation flag.
    pub fn new(config: SolverConfig) -> Self {
        Self {
            config,
            cancel: None,
        }
    }

    /// Stops the search once `flag` is set, reporting what was found so
    /// far.
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Enumerates every solution of `model` into `sink`.
    ///
    /// Each record is sorted by start week and handed to the sink before
    /// the search continues. `sink.finish` is called with the summary.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidConfig`](crate::error::ItineraryError::InvalidConfig)
    /// for a rejected [`SolverConfig`]. Infeasibility and limits are not
    /// errors; see [`EnumerationSummary::status`].
    pub fn run<S>(&self, model: &ScheduleModel, sink: &mut S) -> Result<EnumerationSummary>
    where
        S: SolutionSink + ?Sized,
    {
        info!(
            sections = model.sections().len(),
            start_week = model.start_week(),
            total_weeks = model.total_weeks(),
            "enumerating schedules"
        );

        let mut interrupt = self.cancel.clone().map(InterruptMonitor::new);
        let mut no_op = NoOpMonitor;
        let monitor: &mut dyn SearchMonitor = match interrupt.as_mut() {
            Some(m) => m,
            None => &mut no_op,
        };

        let mut solution_count = 0u64;
        let outcome = DepthFirstSolver::new().enumerate_with_monitor(
            model.cp(),
            &self.config,
            monitor,
            &mut |assignment: &Assignment<'_>| {
                solution_count += 1;
                sink.accept(&model.record(assignment));
            },
        )?;

        let summary = EnumerationSummary {
            status: outcome.status,
            solution_count,
            termination: outcome.termination,
            statistics: outcome.statistics,
        };
        info!(
            status = %summary.status,
            solutions = summary.solution_count,
            termination = %summary.termination,
            elapsed_ms = summary.statistics.time_total.as_millis() as u64,
            "enumeration finished"
        );
        sink.finish(&summary);
        Ok(summary)
    }

    /// Counts solutions without keeping them.
    pub fn count(&self, model: &ScheduleModel) -> Result<EnumerationSummary> {
        self.run(model, &mut CountingSink::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cp::{Branching, ValueOrder};
    use crate::error::ItineraryError;
    use crate::schedule::{CollectingSink, CountingSink, ScheduleBuilder, SolutionRecord};
    use crate::section::SectionSpec;
    use proptest::prelude::*;
    use std::collections::BTreeSet;
    use std::sync::atomic::Ordering;

    fn weeks(name: &str, range: std::ops::Range<i64>, duration: i64) -> SectionSpec {
        SectionSpec::from_weeks(name, range, duration).unwrap()
    }

    fn collect(model: &ScheduleModel, config: SolverConfig) -> (EnumerationSummary, Vec<SolutionRecord>) {
        let mut sink = CollectingSink::new();
        let summary = Enumerator::new(config).run(model, &mut sink).unwrap();
        (summary, sink.into_records())
    }

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn quiet() -> SolverConfig {
        SolverConfig::default().with_progress_interval(0)
    }

    #[test]
    fn test_two_sections_two_orders() {
        init_tracing();
        let model = ScheduleBuilder::new(1)
            .section(weeks("A", 1..11, 4))
            .section(weeks("B", 1..11, 6))
            .build()
            .unwrap();
        let (summary, records) = collect(&model, quiet());
        assert_eq!(summary.status, SolverStatus::Optimal);
        assert_eq!(summary.solution_count, 2);

        let got: BTreeSet<_> = records
            .iter()
            .map(|r| {
                r.triples()
                    .into_iter()
                    .map(|(n, s, e)| (n.to_string(), s, e))
                    .collect::<Vec<_>>()
            })
            .collect();
        let expected: BTreeSet<_> = [
            vec![("A".to_string(), 1, 5), ("B".to_string(), 5, 11)],
            vec![("B".to_string(), 1, 7), ("A".to_string(), 7, 11)],
        ]
        .into_iter()
        .collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn test_adjacency_matches_manual_permutations() {
        let model = ScheduleBuilder::new(1)
            .section(weeks("A", 1..4, 1).with_required_neighbours(["B"]))
            .section(weeks("B", 1..4, 1).with_banned_neighbours(["C"]))
            .section(weeks("C", 1..4, 1))
            .build()
            .unwrap();
        let (summary, records) = collect(&model, quiet());

        let names = ["A", "B", "C"];
        let perms = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];
        let touching = |order: &[usize; 3], x: usize, y: usize| {
            let px = order.iter().position(|&i| i == x).unwrap();
            let py = order.iter().position(|&i| i == y).unwrap();
            px.abs_diff(py) == 1
        };
        let expected: BTreeSet<Vec<&str>> = perms
            .iter()
            .filter(|p| touching(p, 0, 1) && !touching(p, 1, 2))
            .map(|p| p.iter().map(|&i| names[i]).collect())
            .collect();
        assert_eq!(
            expected,
            [vec!["B", "A", "C"], vec!["C", "A", "B"]].into_iter().collect()
        );

        let got: BTreeSet<Vec<&str>> = records.iter().map(|r| r.order()).collect();
        assert_eq!(got, expected);
        assert_eq!(summary.solution_count, 2);
    }

    #[test]
    fn test_empty_window_is_infeasible() {
        let model = ScheduleBuilder::new(1)
            .section(weeks("A", 1..5, 2))
            .section(weeks("Late", 40..50, 2))
            .build()
            .unwrap();
        let mut sink = CountingSink::new();
        let summary = Enumerator::new(quiet()).run(&model, &mut sink).unwrap();
        assert_eq!(summary.status, SolverStatus::Infeasible);
        assert_eq!(summary.solution_count, 0);
        assert_eq!(sink.count(), 0);
    }

    #[test]
    fn test_unknown_period_fails_before_solving() {
        let err = SectionSpec::new("Moon", &["Smarch"], 2).unwrap_err();
        assert!(matches!(err, ItineraryError::UnknownPeriod { ref period } if period == "Smarch"));
    }

    #[test]
    fn test_calendar_trip_wraps_year_end() {
        init_tracing();
        // Nov-Dec then Jan: December's second occurrence is outside the
        // horizon, January is week 53 onward.
        let model = ScheduleBuilder::new(47)
            .section(SectionSpec::new("South America", &["November", "December"], 3).unwrap())
            .section(SectionSpec::new("Japan", &["December", "January"], 4).unwrap())
            .build()
            .unwrap();
        let (summary, records) = collect(&model, quiet());
        assert_eq!(summary.status, SolverStatus::Optimal);
        assert!(!records.is_empty());
        for r in &records {
            assert_eq!(r.sections()[0].start_week, 47);
            assert_eq!(r.sections()[1].end_week, 54);
        }
    }

    #[test]
    fn test_empty_trip_has_one_empty_solution() {
        let model = ScheduleBuilder::new(1).build().unwrap();
        let (summary, records) = collect(&model, quiet());
        assert_eq!(summary.status, SolverStatus::Optimal);
        assert_eq!(records, vec![SolutionRecord::new(Vec::new())]);
    }

    #[test]
    fn test_solution_limit_reports_feasible() {
        let model = ScheduleBuilder::new(0)
            .sections((0..4).map(|i| weeks(&format!("S{i}"), 0..10, 1)))
            .build()
            .unwrap();
        let summary = Enumerator::new(quiet().with_solution_limit(5))
            .count(&model)
            .unwrap();
        assert_eq!(summary.status, SolverStatus::Feasible);
        assert_eq!(summary.termination, TerminationReason::SolutionLimit);
        assert_eq!(summary.solution_count, 5);
    }

    #[test]
    fn test_cancel_flag() {
        let model = ScheduleBuilder::new(0)
            .sections((0..4).map(|i| weeks(&format!("S{i}"), 0..10, 1)))
            .build()
            .unwrap();
        let flag = Arc::new(AtomicBool::new(false));
        let enumerator = Enumerator::new(quiet()).with_cancel(flag.clone());

        let mut seen = 0;
        let summary = enumerator
            .run(&model, &mut |_: &SolutionRecord| {
                seen += 1;
                if seen == 3 {
                    flag.store(true, Ordering::Relaxed);
                }
            })
            .unwrap();
        assert_eq!(summary.termination, TerminationReason::Interrupted);
        assert_eq!(summary.status, SolverStatus::Feasible);
        assert_eq!(summary.solution_count, 3);
    }

    #[test]
    fn test_invalid_config() {
        let model = ScheduleBuilder::new(1)
            .section(weeks("A", 1..5, 2))
            .build()
            .unwrap();
        let err = Enumerator::new(quiet().with_num_workers(8))
            .count(&model)
            .unwrap_err();
        assert!(matches!(err, ItineraryError::InvalidConfig(_)));
    }

    #[test]
    fn test_summary_display() {
        let model = ScheduleBuilder::new(1)
            .section(weeks("A", 1..11, 4))
            .section(weeks("B", 1..11, 6))
            .build()
            .unwrap();
        let summary = Enumerator::new(quiet()).count(&model).unwrap();
        let text = summary.to_string();
        assert!(text.starts_with("Status = OPTIMAL"));
        assert!(text.contains("solutions found: 2"));
    }

    #[test]
    fn test_finish_called_once() {
        struct Recorder {
            accepted: u64,
            finished: Vec<u64>,
        }
        impl SolutionSink for Recorder {
            fn accept(&mut self, _record: &SolutionRecord) {
                self.accepted += 1;
            }
            fn finish(&mut self, summary: &EnumerationSummary) {
                self.finished.push(summary.solution_count);
            }
        }

        let model = ScheduleBuilder::new(1)
            .section(weeks("A", 1..11, 4))
            .section(weeks("B", 1..11, 6))
            .build()
            .unwrap();
        let mut sink = Recorder {
            accepted: 0,
            finished: Vec::new(),
        };
        Enumerator::new(quiet()).run(&model, &mut sink).unwrap();
        assert_eq!(sink.accepted, 2);
        assert_eq!(sink.finished, vec![2]);
    }

    #[derive(Debug, Clone)]
    struct Leg {
        duration: i64,
        first: i64,
        last: i64,
        hole: Option<i64>,
    }

    #[derive(Debug, Clone)]
    struct Trip {
        legs: Vec<Leg>,
        required: Vec<(usize, usize)>,
        banned: Vec<(usize, usize)>,
    }

    fn trip_strategy() -> impl Strategy<Value = Trip> {
        let leg = (1i64..=3, 0i64..6, 4i64..14, proptest::option::of(0i64..14)).prop_map(
            |(duration, first, span, hole)| Leg {
                duration,
                first,
                last: first + span,
                hole,
            },
        );
        proptest::collection::vec(leg, 1..=5).prop_flat_map(|legs| {
            let n = legs.len();
            let pair = (0..n, 0..n);
            (
                Just(legs),
                proptest::collection::vec(pair.clone(), 0..=1),
                proptest::collection::vec(pair, 0..=1),
            )
                .prop_map(|(legs, required, banned)| Trip {
                    legs,
                    required: required.into_iter().filter(|(a, b)| a != b).collect(),
                    banned: banned.into_iter().filter(|(a, b)| a != b).collect(),
                })
        })
    }

    fn leg_name(i: usize) -> String {
        format!("L{i}")
    }

    fn build_trip(trip: &Trip) -> (ScheduleModel, Vec<SectionSpec>) {
        let specs: Vec<SectionSpec> = trip
            .legs
            .iter()
            .enumerate()
            .map(|(i, leg)| {
                let allowed = (leg.first..=leg.last).filter(|w| Some(*w) != leg.hole);
                let required = trip
                    .required
                    .iter()
                    .filter(|(a, _)| *a == i)
                    .map(|(_, b)| leg_name(*b));
                let banned = trip
                    .banned
                    .iter()
                    .filter(|(a, _)| *a == i)
                    .map(|(_, b)| leg_name(*b));
                SectionSpec::from_weeks(leg_name(i), allowed, leg.duration)
                    .unwrap()
                    .with_required_neighbours(required)
                    .with_banned_neighbours(banned)
            })
            .collect();
        let model = ScheduleBuilder::new(TRIP_START)
            .sections(specs.clone())
            .build()
            .unwrap();
        (model, specs)
    }

    const TRIP_START: i64 = 2;

    type Placement = Vec<(String, i64, i64)>;

    fn permutations(n: usize) -> Vec<Vec<usize>> {
        if n == 0 {
            return vec![Vec::new()];
        }
        let mut out = Vec::new();
        for rest in permutations(n - 1) {
            for pos in 0..=rest.len() {
                let mut p = rest.clone();
                p.insert(pos, n - 1);
                out.push(p);
            }
        }
        out
    }

    /// Every schedule of `trip`, found by trying each order of the legs
    /// packed from the trip start.
    fn brute_force(trip: &Trip) -> BTreeSet<Placement> {
        let allowed = |leg: &Leg, week: i64| {
            (leg.first..=leg.last).contains(&week) && Some(week) != leg.hole
        };
        let touch = |a: (i64, i64), b: (i64, i64)| a.0 == b.1 || a.1 == b.0;

        let mut found = BTreeSet::new();
        for order in permutations(trip.legs.len()) {
            let mut spans = vec![(0, 0); trip.legs.len()];
            let mut cursor = TRIP_START;
            for &i in &order {
                spans[i] = (cursor, cursor + trip.legs[i].duration);
                cursor = spans[i].1;
            }

            let seasons_ok = trip
                .legs
                .iter()
                .zip(&spans)
                .all(|(leg, &(s, e))| (s..e).all(|w| allowed(leg, w)));
            let required_ok = trip.required.iter().all(|&(a, b)| touch(spans[a], spans[b]));
            let banned_ok = trip.banned.iter().all(|&(a, b)| !touch(spans[a], spans[b]));

            if seasons_ok && required_ok && banned_ok {
                found.insert(
                    order
                        .iter()
                        .map(|&i| (leg_name(i), spans[i].0, spans[i].1))
                        .collect(),
                );
            }
        }
        found
    }

    fn placements(records: &[SolutionRecord]) -> BTreeSet<Placement> {
        records
            .iter()
            .map(|r| {
                r.triples()
                    .into_iter()
                    .map(|(n, s, e)| (n.to_string(), s, e))
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_permutations() {
        assert_eq!(permutations(0), vec![Vec::<usize>::new()]);
        let all: BTreeSet<_> = permutations(3).into_iter().collect();
        assert_eq!(all.len(), 6);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_every_record_is_feasible(trip in trip_strategy()) {
            let (model, specs) = build_trip(&trip);
            let (summary, records) = collect(&model, quiet());
            prop_assert!(summary.status.is_complete());
            prop_assert_eq!(summary.solution_count as usize, records.len());

            for record in &records {
                prop_assert_eq!(record.len(), specs.len());

                for spec in &specs {
                    let placed = record.get(spec.name()).unwrap();
                    prop_assert_eq!(placed.weeks(), spec.duration());
                    for w in placed.start_week..placed.end_week {
                        prop_assert!(spec.allowed_weeks().contains(&w));
                    }
                    for other in spec.required_neighbours() {
                        prop_assert!(placed.touches(record.get(other).unwrap()));
                    }
                    for other in spec.banned_neighbours() {
                        prop_assert!(!placed.touches(record.get(other).unwrap()));
                    }
                }

                let mut cursor = model.start_week();
                for placed in record {
                    prop_assert_eq!(placed.start_week, cursor);
                    cursor = placed.end_week;
                }
                prop_assert_eq!(cursor, model.end_week());
            }

            let distinct: BTreeSet<_> = records.iter().collect();
            prop_assert_eq!(distinct.len(), records.len());
        }

        #[test]
        fn prop_rerun_and_strategies_agree(trip in trip_strategy(), seed in any::<u64>()) {
            let (model, _) = build_trip(&trip);
            let (_, first) = collect(&model, quiet());
            let (_, again) = collect(&model, quiet());
            prop_assert_eq!(&first, &again);

            let (_, first_fail) = collect(&model, quiet().with_branching(Branching::FirstFail));
            let (_, shuffled) = collect(
                &model,
                quiet().with_value_order(ValueOrder::Shuffled { seed }),
            );
            let as_set = |rs: &[SolutionRecord]| rs.iter().cloned().collect::<BTreeSet<_>>();
            prop_assert_eq!(as_set(&first), as_set(&first_fail));
            prop_assert_eq!(as_set(&first), as_set(&shuffled));
        }

        #[test]
        fn prop_matches_brute_force(trip in trip_strategy()) {
            let (model, _) = build_trip(&trip);
            let expected = brute_force(&trip);

            let (summary, records) = collect(&model, quiet());
            prop_assert_eq!(summary.solution_count as usize, expected.len());
            prop_assert_eq!(placements(&records), expected.clone());

            let (_, first_fail) = collect(&model, quiet().with_branching(Branching::FirstFail));
            prop_assert_eq!(placements(&first_fail), expected);
        }
    }
}
