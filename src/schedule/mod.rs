//! Itinerary scheduling: model construction, enumeration and solution
//! sinks.
//!
//! Control flow is [`SectionSpec`](crate::section::SectionSpec)s →
//! [`ScheduleBuilder`] → [`ScheduleModel`] → [`Enumerator`] → a
//! [`SolutionSink`], one [`SolutionRecord`] at a time.

#[cfg(feature = "parallel")]
mod batch;
mod builder;
mod enumerator;
mod record;
mod sink;

#[cfg(feature = "parallel")]
pub use batch::solve_counts;
pub use builder::{ScheduleBuilder, ScheduleModel, SectionWindow};
pub use enumerator::{EnumerationSummary, Enumerator};
pub use record::{ScheduledSection, SolutionRecord};
pub use sink::{CollectingSink, CountingSink, OccupancySink, SolutionSink, WriterSink};
