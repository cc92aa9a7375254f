//! Parallel solving of independent models.

use super::builder::ScheduleModel;
use super::enumerator::{EnumerationSummary, Enumerator};
use crate::cp::SolverConfig;
use crate::error::Result;
use rayon::prelude::*;

/// Counts the solutions of several models in parallel.
///
/// Each model is enumerated by its own single-worker search, so every
/// summary is identical to a sequential [`Enumerator::count`]. Summaries
/// come back in input order.
pub fn solve_counts(
    models: &[ScheduleModel],
    config: &SolverConfig,
) -> Vec<Result<EnumerationSummary>> {
    models
        .par_iter()
        .map(|model| Enumerator::new(config.clone()).count(model))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::ScheduleBuilder;
    use crate::section::SectionSpec;

    #[test]
    fn test_matches_sequential() {
        let models: Vec<ScheduleModel> = (1..=4)
            .map(|n| {
                ScheduleBuilder::new(0)
                    .sections((0..n).map(|i| SectionSpec::from_weeks(format!("S{i}"), 0..8, 1).unwrap()))
                    .build()
                    .unwrap()
            })
            .collect();
        let config = SolverConfig::default().with_progress_interval(0);

        let counts: Vec<u64> = solve_counts(&models, &config)
            .into_iter()
            .map(|r| r.unwrap().solution_count)
            .collect();
        assert_eq!(counts, vec![1, 2, 6, 24]);
    }
}
