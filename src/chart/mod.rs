//! Chart layer: from filter selections to renderable chart specifications.
//!
//! ```text
//!   FilterState ──┐
//!                 ▼
//!   DatasetStore ─► aggregate::*  ─► result rows
//!                                       │
//!                                       ▼
//!                               render::*  ─► ChartSpec ─► UI
//! ```

pub mod render;
pub mod spec;

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::data::aggregate;
use crate::data::filter::FilterState;
use crate::data::store::DatasetStore;
use spec::ChartSpec;

/// The four dashboard charts, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChartId {
    HistoricalResults,
    TopSchools,
    RecurrentIncome,
    IncomeDistribution,
}

impl ChartId {
    pub const ALL: [ChartId; 4] = [
        ChartId::HistoricalResults,
        ChartId::TopSchools,
        ChartId::RecurrentIncome,
        ChartId::IncomeDistribution,
    ];

    /// Stable identifier used on the command line and in exported specs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartId::HistoricalResults => "average-naplan-results",
            ChartId::TopSchools => "top-schools",
            ChartId::RecurrentIncome => "recurrent-income",
            ChartId::IncomeDistribution => "income-distribution",
        }
    }

    pub fn tab_label(&self) -> &'static str {
        match self {
            ChartId::HistoricalResults => "Historical NAPLAN Results",
            ChartId::TopSchools => "Top Schools",
            ChartId::RecurrentIncome => "Recurrent Income",
            ChartId::IncomeDistribution => "Income Distribution",
        }
    }
}

impl fmt::Display for ChartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ChartId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownChart(pub String);

impl fmt::Display for UnknownChart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let known: Vec<&str> = ChartId::ALL.iter().map(ChartId::as_str).collect();
        write!(f, "unknown chart '{}', expected one of {}", self.0, known.join(", "))
    }
}

impl std::error::Error for UnknownChart {}

impl FromStr for ChartId {
    type Err = UnknownChart;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChartId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| UnknownChart(s.to_string()))
    }
}

/// Run one aggregate-then-render cycle for whichever chart `filters` targets.
///
/// Each call is independent: nothing is cached and the store is only read.
pub fn render(store: &DatasetStore, filters: &FilterState) -> ChartSpec {
    match filters {
        FilterState::HistoricalResults { schools, domain } => render::historical_results(
            &aggregate::historical_performance(store, schools, *domain),
            *domain,
            !schools.is_empty(),
        ),
        FilterState::TopSchools { year, skill } => {
            render::top_schools(&aggregate::top_schools(store, *year, *skill))
        }
        FilterState::RecurrentIncome { schools } => render::recurrent_income(
            &aggregate::recurrent_income_trend(store, schools),
            schools.len(),
        ),
        FilterState::IncomeDistribution { schools } => render::income_distribution(
            &aggregate::income_distribution(store, schools),
            schools.len(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_ids_round_trip_through_strings() {
        for id in ChartId::ALL {
            assert_eq!(id.as_str().parse::<ChartId>(), Ok(id));
        }
        let err = "pie".parse::<ChartId>().expect_err("unknown");
        assert!(err.to_string().contains("top-schools"));
    }

    #[test]
    fn every_chart_renders_from_an_empty_store() {
        let store = DatasetStore::default();
        for id in ChartId::ALL {
            let spec = render(&store, &FilterState::initial(id));
            assert_eq!(spec.chart, id);
            assert_eq!(spec.point_count(), 0);
        }
    }
}
