//! Pure transforms from the store and a chart's selections to a result table.
//!
//! None of these fail: an empty or unmatched selection yields an empty table.

use std::collections::BTreeMap;

use serde::Serialize;

use super::filter::{Choice, SchoolSelection};
use super::model::{Domain, RecurrentIncomeRecord, INCOME_SOURCES, TOTAL_GROSS_INCOME};
use super::store::DatasetStore;

/// One point of the historical performance chart.
///
/// `domain` is `None` for the cross-domain average and `Some` when the rows
/// were filtered to a single domain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoricalRow {
    pub school_name: String,
    pub results_year: i32,
    pub year_level: String,
    pub domain: Option<Domain>,
    pub avg: f64,
}

/// One bar of the top-schools ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedSchool {
    pub school_name: String,
    /// Set when the ranking is for a single year.
    pub results_year: Option<i32>,
    pub avg: f64,
}

/// Running sum and count for an arithmetic mean.
#[derive(Debug, Clone, Copy, Default)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn value(&self) -> f64 {
        self.sum / self.count as f64
    }
}

/// Group `(key, value)` pairs and average each group. Keys come out sorted.
fn group_mean<K: Ord>(pairs: impl IntoIterator<Item = (K, f64)>) -> BTreeMap<K, f64> {
    let mut groups: BTreeMap<K, Mean> = BTreeMap::new();
    for (key, value) in pairs {
        groups.entry(key).or_default().push(value);
    }
    groups.into_iter().map(|(k, m)| (k, m.value())).collect()
}

// ---------------------------------------------------------------------------
// Historical performance
// ---------------------------------------------------------------------------

/// NAPLAN results for the selected schools.
///
/// With `Choice::All` the rows are averaged per (school, year, year level)
/// across domains. With a specific domain the matching source rows are
/// returned as-is, in source order.
pub fn historical_performance(
    store: &DatasetStore,
    schools: &SchoolSelection,
    domain: Choice<Domain>,
) -> Vec<HistoricalRow> {
    let selected = store
        .naplan_results()
        .iter()
        .filter(|r| schools.contains(&r.school_name));

    let rows: Vec<HistoricalRow> = match domain {
        Choice::All => group_mean(selected.map(|r| {
            (
                (r.school_name.clone(), r.results_year, r.year_level.clone()),
                r.avg,
            )
        }))
        .into_iter()
        .map(|((school_name, results_year, year_level), avg)| HistoricalRow {
            school_name,
            results_year,
            year_level,
            domain: None,
            avg,
        })
        .collect(),
        Choice::Only(wanted) => selected
            .filter(|r| r.domain == wanted)
            .map(|r| HistoricalRow {
                school_name: r.school_name.clone(),
                results_year: r.results_year,
                year_level: r.year_level.clone(),
                domain: Some(r.domain),
                avg: r.avg,
            })
            .collect(),
    };

    log::debug!(
        "historical performance: {} schools, domain {domain} -> {} rows",
        schools.len(),
        rows.len()
    );
    rows
}

// ---------------------------------------------------------------------------
// Top schools
// ---------------------------------------------------------------------------

/// Mean score per school, sorted ascending by that mean.
///
/// `year` restricts to one results year, `skill` to one domain.
pub fn top_schools(store: &DatasetStore, year: Choice<i32>, skill: Choice<Domain>) -> Vec<RankedSchool> {
    let matching = store
        .naplan_results()
        .iter()
        .filter(|r| year.admits(&r.results_year) && skill.admits(&r.domain));

    let mut ranked: Vec<RankedSchool> = match year {
        Choice::All => group_mean(matching.map(|r| (r.school_name.clone(), r.avg)))
            .into_iter()
            .map(|(school_name, avg)| RankedSchool {
                school_name,
                results_year: None,
                avg,
            })
            .collect(),
        Choice::Only(_) => group_mean(matching.map(|r| ((r.school_name.clone(), r.results_year), r.avg)))
            .into_iter()
            .map(|((school_name, results_year), avg)| RankedSchool {
                school_name,
                results_year: Some(results_year),
                avg,
            })
            .collect(),
    };

    // Stable: ties stay in school-name order.
    ranked.sort_by(|a, b| a.avg.total_cmp(&b.avg));

    log::debug!("top schools: year {year}, skill {skill} -> {} rows", ranked.len());
    ranked
}

// ---------------------------------------------------------------------------
// Recurrent income
// ---------------------------------------------------------------------------

fn income_rows<'a>(
    store: &'a DatasetStore,
    schools: &'a SchoolSelection,
    include: impl Fn(&str) -> bool + 'a,
) -> impl Iterator<Item = &'a RecurrentIncomeRecord> + 'a {
    store
        .recurrent_income()
        .iter()
        .filter(move |r| include(r.income_source.as_str()) && schools.contains(&r.school_name))
}

/// Per-source funding rows for the selected schools, excluding the total.
pub fn income_distribution(store: &DatasetStore, schools: &SchoolSelection) -> Vec<RecurrentIncomeRecord> {
    let rows: Vec<_> = income_rows(store, schools, |source| INCOME_SOURCES.iter().any(|s| *s == source))
        .cloned()
        .collect();
    log::debug!(
        "income distribution: {} schools -> {} rows",
        schools.len(),
        rows.len()
    );
    rows
}

/// "Total gross income" rows for the selected schools.
pub fn recurrent_income_trend(store: &DatasetStore, schools: &SchoolSelection) -> Vec<RecurrentIncomeRecord> {
    let rows: Vec<_> = income_rows(store, schools, |source| source == TOTAL_GROSS_INCOME)
        .cloned()
        .collect();
    log::debug!(
        "recurrent income: {} schools -> {} rows",
        schools.len(),
        rows.len()
    );
    rows
}
