use std::collections::BTreeMap;

use crate::chart::spec::ChartSpec;
use crate::chart::{self, ChartId};
use crate::data::filter::{Choice, FilterState};
use crate::data::model::Domain;
use crate::data::store::DatasetStore;

// ---------------------------------------------------------------------------
// Dropdown options
// ---------------------------------------------------------------------------

/// Values offered by the filter dropdowns, read once from the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOptions {
    pub naplan_schools: Vec<String>,
    pub domains: Vec<Domain>,
    pub results_years: Vec<i32>,
    pub income_schools: Vec<String>,
}

impl FilterOptions {
    pub fn from_store(store: &DatasetStore) -> Self {
        FilterOptions {
            naplan_schools: store.naplan_schools(),
            domains: store.naplan_domains(),
            results_years: store.results_years(),
            income_schools: store.income_schools(),
        }
    }

    /// School names offered on a chart's tab.
    pub fn schools_for(&self, chart: ChartId) -> &[String] {
        match chart {
            ChartId::HistoricalResults | ChartId::TopSchools => &self.naplan_schools,
            ChartId::RecurrentIncome | ChartId::IncomeDistribution => &self.income_schools,
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Tab currently shown.
    pub active_tab: ChartId,

    pub options: FilterOptions,

    /// Current selections per chart.
    filters: BTreeMap<ChartId, FilterState>,

    /// Last rendered spec per chart, replaced whenever its filters change.
    charts: BTreeMap<ChartId, ChartSpec>,
}

impl AppState {
    /// Initialise every tab with default selections and render it once.
    pub fn new(store: &DatasetStore) -> Self {
        let filters: BTreeMap<ChartId, FilterState> = ChartId::ALL
            .into_iter()
            .map(|id| (id, FilterState::initial(id)))
            .collect();
        let charts = filters
            .iter()
            .map(|(id, f)| (*id, chart::render(store, f)))
            .collect();

        Self {
            active_tab: ChartId::HistoricalResults,
            options: FilterOptions::from_store(store),
            filters,
            charts,
        }
    }

    pub fn filters(&self, chart: ChartId) -> Option<&FilterState> {
        self.filters.get(&chart)
    }

    pub fn chart(&self, chart: ChartId) -> Option<&ChartSpec> {
        self.charts.get(&chart)
    }

    /// Apply an edit to one chart's selections and re-render that chart only
    /// if the selections actually changed.
    pub fn update_filters(
        &mut self,
        store: &DatasetStore,
        chart: ChartId,
        edit: impl FnOnce(&mut FilterState),
    ) {
        let current = self
            .filters
            .get(&chart)
            .cloned()
            .unwrap_or_else(|| FilterState::initial(chart));
        let mut next = current.clone();
        edit(&mut next);
        if next == current {
            return;
        }

        log::debug!("{chart}: filters changed to {next:?}");
        self.charts.insert(chart, chart::render(store, &next));
        self.filters.insert(chart, next);
    }

    /// Toggle a school in a chart's multi-select.
    pub fn toggle_school(&mut self, store: &DatasetStore, chart: ChartId, school: &str) {
        self.update_filters(store, chart, |f| {
            if let Some(schools) = f.schools_mut() {
                schools.toggle(school);
            }
        });
    }

    /// Deselect every school of a chart.
    pub fn clear_schools(&mut self, store: &DatasetStore, chart: ChartId) {
        self.update_filters(store, chart, |f| {
            if let Some(schools) = f.schools_mut() {
                schools.clear();
            }
        });
    }

    pub fn set_domain(&mut self, store: &DatasetStore, choice: Choice<Domain>) {
        self.update_filters(store, ChartId::HistoricalResults, |f| {
            if let FilterState::HistoricalResults { domain, .. } = f {
                *domain = choice;
            }
        });
    }

    pub fn set_year(&mut self, store: &DatasetStore, choice: Choice<i32>) {
        self.update_filters(store, ChartId::TopSchools, |f| {
            if let FilterState::TopSchools { year, .. } = f {
                *year = choice;
            }
        });
    }

    pub fn set_skill(&mut self, store: &DatasetStore, choice: Choice<Domain>) {
        self.update_filters(store, ChartId::TopSchools, |f| {
            if let FilterState::TopSchools { skill, .. } = f {
                *skill = choice;
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{NaplanResultRecord, RecurrentIncomeRecord, TOTAL_GROSS_INCOME};

    fn store() -> DatasetStore {
        DatasetStore::from_records(
            Vec::new(),
            vec![NaplanResultRecord {
                school_name: "Alpha".to_string(),
                domain: Domain::Reading,
                results_year: 2020,
                year_level: "Year 5".to_string(),
                avg: 500.0,
            }],
            vec![RecurrentIncomeRecord {
                school_name: "Alpha".to_string(),
                year: 2020,
                income_source: TOTAL_GROSS_INCOME.to_string(),
                per_student: 12_000.0,
            }],
        )
    }

    #[test]
    fn every_tab_starts_rendered() {
        let store = store();
        let state = AppState::new(&store);
        for id in ChartId::ALL {
            assert!(state.chart(id).is_some());
        }
        // Top schools needs no selection.
        assert_eq!(state.chart(ChartId::TopSchools).map(|c| c.point_count()), Some(1));
        assert_eq!(state.options.naplan_schools, vec!["Alpha".to_string()]);
    }

    #[test]
    fn toggling_a_school_rerenders_only_that_chart() {
        let store = store();
        let mut state = AppState::new(&store);
        let before_income = state.chart(ChartId::IncomeDistribution).cloned();

        state.toggle_school(&store, ChartId::RecurrentIncome, "Alpha");

        assert_eq!(state.chart(ChartId::RecurrentIncome).map(|c| c.point_count()), Some(1));
        assert_eq!(state.chart(ChartId::IncomeDistribution).cloned(), before_income);

        state.clear_schools(&store, ChartId::RecurrentIncome);
        assert_eq!(state.chart(ChartId::RecurrentIncome).map(|c| c.point_count()), Some(0));
    }

    #[test]
    fn single_choice_setters_target_their_chart() {
        let store = store();
        let mut state = AppState::new(&store);

        state.set_year(&store, Choice::Only(1999));
        assert_eq!(state.chart(ChartId::TopSchools).map(|c| c.point_count()), Some(0));

        state.set_domain(&store, Choice::Only(Domain::Writing));
        assert_eq!(
            state.filters(ChartId::HistoricalResults),
            Some(&FilterState::HistoricalResults {
                schools: Default::default(),
                domain: Choice::Only(Domain::Writing),
            })
        );
    }
}
