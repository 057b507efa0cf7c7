use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use super::model::Domain;
use crate::chart::ChartId;

// ---------------------------------------------------------------------------
// Choice – a single-select filter with an "All" sentinel
// ---------------------------------------------------------------------------

/// Sentinel label for "no restriction" in single-choice dropdowns.
pub const ALL_LABEL: &str = "All";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Choice<T> {
    #[default]
    All,
    Only(T),
}

impl<T: PartialEq> Choice<T> {
    /// Whether `value` passes this filter.
    pub fn admits(&self, value: &T) -> bool {
        match self {
            Choice::All => true,
            Choice::Only(selected) => selected == value,
        }
    }
}

impl<T> Choice<T> {
    pub fn is_all(&self) -> bool {
        matches!(self, Choice::All)
    }
}

impl<T: FromStr> Choice<T> {
    /// Parse a dropdown value; `"All"` maps to [`Choice::All`].
    pub fn parse(raw: &str) -> Result<Self, T::Err> {
        if raw.trim() == ALL_LABEL {
            Ok(Choice::All)
        } else {
            raw.trim().parse().map(Choice::Only)
        }
    }
}

impl<T: fmt::Display> fmt::Display for Choice<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::All => f.write_str(ALL_LABEL),
            Choice::Only(value) => value.fmt(f),
        }
    }
}

// ---------------------------------------------------------------------------
// SchoolSelection – a multi-select filter
// ---------------------------------------------------------------------------

/// Zero or more selected school names. Empty means nothing is shown.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SchoolSelection(BTreeSet<String>);

impl SchoolSelection {
    pub fn new<I, S>(schools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SchoolSelection(schools.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, school: &str) -> bool {
        self.0.contains(school)
    }

    /// Add the school if absent, remove it if present.
    pub fn toggle(&mut self, school: &str) {
        if !self.0.remove(school) {
            self.0.insert(school.to_string());
        }
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for SchoolSelection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        SchoolSelection::new(iter)
    }
}

// ---------------------------------------------------------------------------
// FilterState – the inputs of one chart
// ---------------------------------------------------------------------------

/// The user's current selections for one chart.
///
/// Built fresh for every interaction and consumed by a single render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FilterState {
    HistoricalResults {
        schools: SchoolSelection,
        domain: Choice<Domain>,
    },
    TopSchools {
        year: Choice<i32>,
        skill: Choice<Domain>,
    },
    RecurrentIncome {
        schools: SchoolSelection,
    },
    IncomeDistribution {
        schools: SchoolSelection,
    },
}

impl FilterState {
    /// Initial selections for a chart: no schools, every choice at "All".
    pub fn initial(chart: ChartId) -> Self {
        match chart {
            ChartId::HistoricalResults => FilterState::HistoricalResults {
                schools: SchoolSelection::default(),
                domain: Choice::All,
            },
            ChartId::TopSchools => FilterState::TopSchools {
                year: Choice::All,
                skill: Choice::All,
            },
            ChartId::RecurrentIncome => FilterState::RecurrentIncome {
                schools: SchoolSelection::default(),
            },
            ChartId::IncomeDistribution => FilterState::IncomeDistribution {
                schools: SchoolSelection::default(),
            },
        }
    }

    pub fn chart_id(&self) -> ChartId {
        match self {
            FilterState::HistoricalResults { .. } => ChartId::HistoricalResults,
            FilterState::TopSchools { .. } => ChartId::TopSchools,
            FilterState::RecurrentIncome { .. } => ChartId::RecurrentIncome,
            FilterState::IncomeDistribution { .. } => ChartId::IncomeDistribution,
        }
    }

    /// The school multi-select, for charts that have one.
    pub fn schools_mut(&mut self) -> Option<&mut SchoolSelection> {
        match self {
            FilterState::HistoricalResults { schools, .. }
            | FilterState::RecurrentIncome { schools }
            | FilterState::IncomeDistribution { schools } => Some(schools),
            FilterState::TopSchools { .. } => None,
        }
    }
}

/// Separator between school names in a single text input.
pub const SCHOOL_LIST_SEPARATOR: char = '|';

/// A primitive filter value that could not be applied to a chart.
#[derive(Error, Debug, PartialEq)]
pub enum FilterInputError {
    #[error("chart '{chart}' has no '{field}' filter")]
    UnknownField { chart: ChartId, field: String },

    #[error("invalid value '{value}' for '{field}': {message}")]
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },
}

impl FilterState {
    /// Apply one primitive input (as sent by a dropdown) to this chart's
    /// selections.
    ///
    /// `schools` takes names separated by `|`; `domain`, `year` and `skill`
    /// take a single value or `All`.
    pub fn set_input(&mut self, field: &str, value: &str) -> Result<(), FilterInputError> {
        let chart = self.chart_id();
        let invalid = |message: String| FilterInputError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            message,
        };

        match (self, field) {
            (
                FilterState::HistoricalResults { schools, .. }
                | FilterState::RecurrentIncome { schools }
                | FilterState::IncomeDistribution { schools },
                "schools",
            ) => {
                *schools = value
                    .split(SCHOOL_LIST_SEPARATOR)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .collect();
            }
            (FilterState::HistoricalResults { domain, .. }, "domain") => {
                *domain = Choice::<Domain>::parse(value).map_err(|e| invalid(e.to_string()))?;
            }
            (FilterState::TopSchools { skill, .. }, "skill") => {
                *skill = Choice::<Domain>::parse(value).map_err(|e| invalid(e.to_string()))?;
            }
            (FilterState::TopSchools { year, .. }, "year") => {
                *year = Choice::<i32>::parse(value).map_err(|e| invalid(e.to_string()))?;
            }
            _ => {
                return Err(FilterInputError::UnknownField {
                    chart,
                    field: field.to_string(),
                })
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choice_parses_all_sentinel() {
        assert_eq!(Choice::<i32>::parse("All"), Ok(Choice::All));
        assert_eq!(Choice::<i32>::parse(" 2019 "), Ok(Choice::Only(2019)));
        assert!(Choice::<i32>::parse("last year").is_err());
        assert_eq!(
            Choice::<Domain>::parse("Spelling"),
            Ok(Choice::Only(Domain::Spelling))
        );
    }

    #[test]
    fn choice_admits() {
        assert!(Choice::All.admits(&3));
        assert!(Choice::Only(3).admits(&3));
        assert!(!Choice::Only(3).admits(&4));
        assert_eq!(Choice::<Domain>::All.to_string(), "All");
    }

    #[test]
    fn toggle_adds_then_removes() {
        let mut selection = SchoolSelection::default();
        selection.toggle("Alpha");
        assert!(selection.contains("Alpha"));
        selection.toggle("Alpha");
        assert!(selection.is_empty());
    }

    #[test]
    fn primitive_inputs_update_selections() {
        let mut state = FilterState::initial(ChartId::HistoricalResults);
        state.set_input("schools", "Alpha | Beta|").expect("schools");
        state.set_input("domain", "Writing").expect("domain");
        assert_eq!(
            state,
            FilterState::HistoricalResults {
                schools: SchoolSelection::new(["Alpha", "Beta"]),
                domain: Choice::Only(Domain::Writing),
            }
        );

        let mut top = FilterState::initial(ChartId::TopSchools);
        top.set_input("year", "2019").expect("year");
        top.set_input("skill", "All").expect("skill");
        assert_eq!(
            top,
            FilterState::TopSchools {
                year: Choice::Only(2019),
                skill: Choice::All,
            }
        );
    }

    #[test]
    fn bad_inputs_are_rejected() {
        let mut top = FilterState::initial(ChartId::TopSchools);
        assert!(matches!(
            top.set_input("schools", "Alpha"),
            Err(FilterInputError::UnknownField { .. })
        ));
        assert!(matches!(
            top.set_input("year", "soon"),
            Err(FilterInputError::InvalidValue { .. })
        ));
        assert_eq!(top, FilterState::initial(ChartId::TopSchools));
    }

    #[test]
    fn initial_state_matches_chart() {
        for chart in ChartId::ALL {
            assert_eq!(FilterState::initial(chart).chart_id(), chart);
        }
        assert!(FilterState::initial(ChartId::TopSchools)
            .schools_mut()
            .is_none());
    }
}
