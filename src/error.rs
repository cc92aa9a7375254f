//! Error types for itinerary construction and solving.
//!
//! Every structural problem (unknown period, bad duration, dangling
//! neighbour reference) is detected before the search starts. An empty
//! search space is *not* an error: it is reported through
//! [`SolverStatus::Infeasible`](crate::cp::SolverStatus::Infeasible).

use crate::cp::{CpError, ModelError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ItineraryError {
    #[error("unknown calendar period: {period}")]
    UnknownPeriod { period: String },

    #[error("section '{section}' has non-positive duration {duration}")]
    InvalidDuration { section: String, duration: i64 },

    #[error("section '{section}' references unknown neighbour '{neighbour}'")]
    UnknownSection { section: String, neighbour: String },

    #[error("duplicate section name: {name}")]
    DuplicateSection { name: String },

    #[error("horizon ends at week {horizon_end} but the calendar only covers weeks before {calendar_end}")]
    HorizonExceedsCalendar { horizon_end: i64, calendar_end: i64 },

    #[error("horizon starts at week {horizon_start} but the calendar only covers weeks from {calendar_start}")]
    HorizonBeforeCalendar { horizon_start: i64, calendar_start: i64 },

    #[error("horizon starting at week {start_week} overflows the week axis")]
    HorizonOverflow { start_week: i64 },

    #[error("invalid model: {0}")]
    InvalidModel(#[from] ModelError),

    #[error("invalid solver configuration: {0}")]
    InvalidConfig(String),
}

impl From<CpError> for ItineraryError {
    fn from(e: CpError) -> Self {
        match e {
            CpError::Model(e) => ItineraryError::InvalidModel(e),
            CpError::Config(msg) => ItineraryError::InvalidConfig(msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, ItineraryError>;
