use std::path::Path;

use indexmap::IndexSet;

use super::loader;
use super::model::{
    Domain, EnrolmentRecord, NaplanResultRecord, RecurrentIncomeRecord, INCOME_SOURCES,
    TOTAL_GROSS_INCOME,
};
use crate::error::Result;

pub const ENROLMENTS: &str = "enrolments";
pub const NAPLAN_RESULTS: &str = "naplan_results";
pub const RECURRENT_INCOME: &str = "recurrent_income";

/// The three source tables, loaded once and never written afterwards.
///
/// Aggregations borrow the store; nothing hands out mutable access.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetStore {
    enrolments: Vec<EnrolmentRecord>,
    naplan_results: Vec<NaplanResultRecord>,
    recurrent_income: Vec<RecurrentIncomeRecord>,
}

impl DatasetStore {
    /// Load `enrolments`, `naplan_results` and `recurrent_income` from `dir`.
    ///
    /// Each table may be a `.csv` or `.parquet` file. Any missing file,
    /// missing column or malformed cell aborts the load.
    pub fn load(dir: &Path) -> Result<Self> {
        let enrolments = loader::load_enrolments(&loader::locate_table(dir, ENROLMENTS)?)?;
        let naplan_results =
            loader::load_naplan_results(&loader::locate_table(dir, NAPLAN_RESULTS)?)?;
        let recurrent_income =
            loader::load_recurrent_income(&loader::locate_table(dir, RECURRENT_INCOME)?)?;

        log::info!(
            "Loaded {} enrolment, {} NAPLAN and {} income rows from {}",
            enrolments.len(),
            naplan_results.len(),
            recurrent_income.len(),
            dir.display()
        );

        let store = Self::from_records(enrolments, naplan_results, recurrent_income);
        let ignored = store.unused_income_sources();
        if !ignored.is_empty() {
            log::warn!(
                "{RECURRENT_INCOME}: {} income label(s) appear in no chart: {}",
                ignored.len(),
                ignored.join(", ")
            );
        }
        Ok(store)
    }

    pub fn from_records(
        enrolments: Vec<EnrolmentRecord>,
        naplan_results: Vec<NaplanResultRecord>,
        recurrent_income: Vec<RecurrentIncomeRecord>,
    ) -> Self {
        DatasetStore {
            enrolments,
            naplan_results,
            recurrent_income,
        }
    }

    pub fn enrolments(&self) -> &[EnrolmentRecord] {
        &self.enrolments
    }

    pub fn naplan_results(&self) -> &[NaplanResultRecord] {
        &self.naplan_results
    }

    pub fn recurrent_income(&self) -> &[RecurrentIncomeRecord] {
        &self.recurrent_income
    }

    // -- distinct values, in order of first appearance --

    pub fn naplan_schools(&self) -> Vec<String> {
        distinct(self.naplan_results.iter().map(|r| r.school_name.clone()))
    }

    pub fn naplan_domains(&self) -> Vec<Domain> {
        distinct(self.naplan_results.iter().map(|r| r.domain))
    }

    pub fn results_years(&self) -> Vec<i32> {
        distinct(self.naplan_results.iter().map(|r| r.results_year))
    }

    pub fn income_schools(&self) -> Vec<String> {
        distinct(self.recurrent_income.iter().map(|r| r.school_name.clone()))
    }

    /// Income labels that are neither a charted funding source nor the total.
    pub fn unused_income_sources(&self) -> Vec<String> {
        distinct(
            self.recurrent_income
                .iter()
                .map(|r| r.income_source.as_str())
                .filter(|source| *source != TOTAL_GROSS_INCOME && !INCOME_SOURCES.iter().any(|s| s == source)),
        )
        .into_iter()
        .map(str::to_string)
        .collect()
    }
}

/// Unique values of a column, keeping first-appearance order.
pub fn distinct<T, I>(values: I) -> Vec<T>
where
    T: std::hash::Hash + Eq,
    I: IntoIterator<Item = T>,
{
    values.into_iter().collect::<IndexSet<T>>().into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naplan(school: &str, domain: Domain, year: i32) -> NaplanResultRecord {
        NaplanResultRecord {
            school_name: school.to_string(),
            domain,
            results_year: year,
            year_level: "Year 3".to_string(),
            avg: 400.0,
        }
    }

    #[test]
    fn distinct_values_keep_first_appearance_order() {
        let store = DatasetStore::from_records(
            Vec::new(),
            vec![
                naplan("Zeta", Domain::Writing, 2021),
                naplan("Alpha", Domain::Reading, 2019),
                naplan("Zeta", Domain::Reading, 2021),
            ],
            Vec::new(),
        );

        assert_eq!(store.naplan_schools(), vec!["Zeta", "Alpha"]);
        assert_eq!(store.naplan_domains(), vec![Domain::Writing, Domain::Reading]);
        assert_eq!(store.results_years(), vec![2021, 2019]);
        assert!(store.income_schools().is_empty());
    }

    #[test]
    fn unrecognised_income_labels_are_reported() {
        let income = |source: &str| RecurrentIncomeRecord {
            school_name: "Alpha".to_string(),
            year: 2020,
            income_source: source.to_string(),
            per_student: 100.0,
        };
        let store = DatasetStore::from_records(
            Vec::new(),
            Vec::new(),
            vec![
                income(INCOME_SOURCES[0]),
                income(TOTAL_GROSS_INCOME),
                income("Capital expenditure"),
                income("Capital expenditure"),
            ],
        );

        assert_eq!(store.unused_income_sources(), vec!["Capital expenditure"]);
    }
}
