//! Declarative trip configuration.
//!
//! A [`TripConfig`] is plain data: the example trips are expressed as
//! values of this type rather than as separate code paths. With the
//! `serde` feature enabled it can be loaded from any serde format.

use super::spec::SectionSpec;
use crate::error::Result;
use crate::schedule::{ScheduleBuilder, ScheduleModel};

/// Input record for one section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SectionDef {
    pub name: String,
    pub periods: Vec<String>,
    pub duration: i64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub required_neighbours: Vec<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub banned_neighbours: Vec<String>,
}

impl SectionDef {
    pub fn new<S: Into<String>>(
        name: impl Into<String>,
        periods: impl IntoIterator<Item = S>,
        duration: i64,
    ) -> Self {
        Self {
            name: name.into(),
            periods: periods.into_iter().map(Into::into).collect(),
            duration,
            ..Self::default()
        }
    }

    pub fn with_required_neighbours<S: Into<String>>(
        mut self,
        names: impl IntoIterator<Item = S>,
    ) -> Self {
        self.required_neighbours
            .extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_banned_neighbours<S: Into<String>>(
        mut self,
        names: impl IntoIterator<Item = S>,
    ) -> Self {
        self.banned_neighbours.extend(names.into_iter().map(Into::into));
        self
    }
}

impl TryFrom<&SectionDef> for SectionSpec {
    type Error = crate::error::ItineraryError;

    fn try_from(def: &SectionDef) -> Result<Self> {
        Ok(SectionSpec::new(def.name.clone(), def.periods.as_slice(), def.duration)?
            .with_required_neighbours(def.required_neighbours.iter().cloned())
            .with_banned_neighbours(def.banned_neighbours.iter().cloned()))
    }
}

/// A whole trip: an anchor week plus its sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TripConfig {
    pub start_week: i64,
    pub sections: Vec<SectionDef>,
}

impl TripConfig {
    pub fn new(start_week: i64) -> Self {
        Self {
            start_week,
            sections: Vec::new(),
        }
    }

    pub fn with_section(mut self, section: SectionDef) -> Self {
        self.sections.push(section);
        self
    }

    /// Converts every [`SectionDef`] into a [`SectionSpec`].
    pub fn specs(&self) -> Result<Vec<SectionSpec>> {
        self.sections.iter().map(SectionSpec::try_from).collect()
    }

    /// Runs spec construction and model building in one step.
    pub fn build(&self) -> Result<ScheduleModel> {
        ScheduleBuilder::new(self.start_week)
            .sections(self.specs()?)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ItineraryError;

    fn trip() -> TripConfig {
        TripConfig::new(47)
            .with_section(SectionDef::new("Nepal", ["November", "December"], 3))
            .with_section(
                SectionDef::new("Southeast Asia", ["November", "December", "January"], 4)
                    .with_banned_neighbours(["Nepal"]),
            )
    }

    #[test]
    fn test_specs() {
        let specs = trip().specs().unwrap();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[1].name(), "Southeast Asia");
        assert!(specs[1].banned_neighbours().contains("Nepal"));
    }

    #[test]
    fn test_build() {
        let model = trip().build().unwrap();
        assert_eq!(model.start_week(), 47);
        assert_eq!(model.total_weeks(), 7);
    }

    #[test]
    fn test_build_rejects_bad_duration() {
        let config = TripConfig::new(47).with_section(SectionDef::new("X", ["May"], 0));
        assert!(matches!(
            config.build(),
            Err(ItineraryError::InvalidDuration { .. })
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_json_round_trip() {
        let json = r#"{
            "start_week": 47,
            "sections": [
                { "name": "Nepal", "periods": ["November", "December"], "duration": 3 },
                { "name": "Southeast Asia", "periods": ["November", "December", "January"],
                  "duration": 4, "banned_neighbours": ["Nepal"] }
            ]
        }"#;
        let parsed: TripConfig = serde_json::from_str(json).unwrap();
        assert_eq!(parsed, trip());
    }
}
