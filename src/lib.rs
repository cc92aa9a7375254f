//! Exhaustive itinerary scheduling with a finite-domain constraint solver.
//!
//! Places a fixed set of multi-week travel *sections* back to back on a
//! weekly calendar, subject to:
//!
//! - **Seasons**: every week a section occupies must lie in its allowed
//!   weeks, derived from calendar periods (months).
//! - **Packing**: sections never overlap and tile the horizon with no gaps.
//! - **Adjacency**: named pairs must, or must not, directly abut.
//!
//! Every feasible schedule is enumerated, not just one, and streamed to a
//! caller-supplied sink.
//!
//! # Modules
//!
//! - [`calendar`]: period name ↔ week-index mapping over a two-year table
//! - [`section`]: immutable section specs and declarative trip configs
//! - [`cp`]: interval model and the depth-first enumerating solver
//! - [`schedule`]: model building, enumeration and solution sinks
//!
//! # Example
//!
//! ```
//! use u_itinerary::cp::{SolverConfig, SolverStatus};
//! use u_itinerary::schedule::{CollectingSink, Enumerator, ScheduleBuilder};
//! use u_itinerary::section::SectionSpec;
//!
//! let model = ScheduleBuilder::new(47)
//!     .section(SectionSpec::new("Nepal", &["November", "December"], 4)?)
//!     .section(SectionSpec::new("Japan", &["December", "January"], 3)?)
//!     .build()?;
//!
//! let mut sink = CollectingSink::new();
//! let summary = Enumerator::new(SolverConfig::default()).run(&model, &mut sink)?;
//! assert_eq!(summary.status, SolverStatus::Optimal);
//! assert_eq!(sink.records()[0].order(), vec!["Nepal", "Japan"]);
//! # Ok::<(), u_itinerary::ItineraryError>(())
//! ```

pub mod calendar;
pub mod cp;
pub mod error;
pub mod schedule;
pub mod section;

pub use error::{ItineraryError, Result};
