//! Section specifications and trip configuration.
//!
//! A [`SectionSpec`] is created once from static configuration and never
//! mutated. Names are the join key for adjacency rules, so they must be
//! unique across a trip; uniqueness is checked when the schedule is built.

mod config;
mod spec;

pub use config::{SectionDef, TripConfig};
pub use spec::{count_weeks, SectionSpec};
