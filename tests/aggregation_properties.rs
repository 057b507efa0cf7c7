use naplan_dashboard::data::aggregate::{
    historical_performance, income_distribution, recurrent_income_trend, top_schools,
};
use naplan_dashboard::data::model::{
    Domain, NaplanResultRecord, RecurrentIncomeRecord, INCOME_SOURCES, TOTAL_GROSS_INCOME,
};
use naplan_dashboard::{Choice, DatasetStore, SchoolSelection};
use proptest::prelude::*;

const SCHOOLS: [&str; 4] = ["Alpha", "Beta", "Gamma", "Delta"];
const LEVELS: [&str; 3] = ["Year 3", "Year 5", "Year 7"];

fn naplan_row() -> impl Strategy<Value = NaplanResultRecord> {
    (
        0..SCHOOLS.len(),
        0..Domain::ALL.len(),
        2018i32..2022,
        0..LEVELS.len(),
        0.0f64..1000.0,
    )
        .prop_map(|(school, domain, year, level, avg)| NaplanResultRecord {
            school_name: SCHOOLS[school].to_string(),
            domain: Domain::ALL[domain],
            results_year: year,
            year_level: LEVELS[level].to_string(),
            avg,
        })
}

fn income_row() -> impl Strategy<Value = RecurrentIncomeRecord> {
    (0..SCHOOLS.len(), 2018i32..2022, 0..=INCOME_SOURCES.len(), 0.0f64..30_000.0).prop_map(
        |(school, year, source, amount)| RecurrentIncomeRecord {
            school_name: SCHOOLS[school].to_string(),
            year,
            income_source: INCOME_SOURCES
                .get(source)
                .copied()
                .unwrap_or(TOTAL_GROSS_INCOME)
                .to_string(),
            per_student: amount,
        },
    )
}

fn selection() -> impl Strategy<Value = SchoolSelection> {
    proptest::sample::subsequence(SCHOOLS.to_vec(), 0..=SCHOOLS.len()).prop_map(SchoolSelection::new)
}

fn store(
    naplan: Vec<NaplanResultRecord>,
    income: Vec<RecurrentIncomeRecord>,
) -> DatasetStore {
    DatasetStore::from_records(Vec::new(), naplan, income)
}

fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let values: Vec<f64> = values.into_iter().collect();
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(1.0)
}

proptest! {
    #[test]
    fn all_domain_rows_are_group_means(
        rows in prop::collection::vec(naplan_row(), 0..60),
        schools in selection(),
    ) {
        let store = store(rows.clone(), Vec::new());
        let out = historical_performance(&store, &schools, Choice::All);

        for r in &out {
            prop_assert!(schools.contains(&r.school_name));
            prop_assert_eq!(r.domain, None);
            let expected = mean(
                rows.iter()
                    .filter(|s| {
                        s.school_name == r.school_name
                            && s.results_year == r.results_year
                            && s.year_level == r.year_level
                    })
                    .map(|s| s.avg),
            );
            prop_assert!(expected.is_some_and(|e| close(e, r.avg)));
        }

        let mut groups: Vec<_> = rows
            .iter()
            .filter(|s| schools.contains(&s.school_name))
            .map(|s| (s.school_name.clone(), s.results_year, s.year_level.clone()))
            .collect();
        groups.sort();
        groups.dedup();
        prop_assert_eq!(out.len(), groups.len());
    }

    #[test]
    fn single_domain_rows_are_the_filtered_source_rows(
        rows in prop::collection::vec(naplan_row(), 0..60),
        schools in selection(),
        domain in 0..Domain::ALL.len(),
    ) {
        let domain = Domain::ALL[domain];
        let store = store(rows.clone(), Vec::new());
        let out = historical_performance(&store, &schools, Choice::Only(domain));

        let expected: Vec<(String, i32, String, f64)> = rows
            .iter()
            .filter(|r| schools.contains(&r.school_name) && r.domain == domain)
            .map(|r| (r.school_name.clone(), r.results_year, r.year_level.clone(), r.avg))
            .collect();
        let actual: Vec<(String, i32, String, f64)> = out
            .iter()
            .map(|r| (r.school_name.clone(), r.results_year, r.year_level.clone(), r.avg))
            .collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn top_schools_are_sorted_and_averaged(
        rows in prop::collection::vec(naplan_row(), 0..60),
    ) {
        let store = store(rows.clone(), Vec::new());
        let ranked = top_schools(&store, Choice::All, Choice::All);

        prop_assert!(ranked.windows(2).all(|w| w[0].avg <= w[1].avg));
        for r in &ranked {
            let expected = mean(
                rows.iter()
                    .filter(|s| s.school_name == r.school_name)
                    .map(|s| s.avg),
            );
            prop_assert!(expected.is_some_and(|e| close(e, r.avg)));
        }
        let mut names: Vec<_> = rows.iter().map(|r| r.school_name.as_str()).collect();
        names.sort();
        names.dedup();
        prop_assert_eq!(ranked.len(), names.len());
    }

    #[test]
    fn top_schools_for_a_year_only_rank_that_year(
        rows in prop::collection::vec(naplan_row(), 0..60),
        year in 2018i32..2022,
    ) {
        let store = store(rows, Vec::new());
        let ranked = top_schools(&store, Choice::Only(year), Choice::All);

        prop_assert!(ranked.windows(2).all(|w| w[0].avg <= w[1].avg));
        prop_assert!(ranked.iter().all(|r| r.results_year == Some(year)));
    }

    #[test]
    fn income_filters_respect_category_and_selection(
        rows in prop::collection::vec(income_row(), 0..60),
        schools in selection(),
    ) {
        let store = store(Vec::new(), rows);

        for r in income_distribution(&store, &schools) {
            prop_assert_ne!(r.income_source.as_str(), TOTAL_GROSS_INCOME);
            prop_assert!(schools.contains(&r.school_name));
        }
        for r in recurrent_income_trend(&store, &schools) {
            prop_assert_eq!(r.income_source.as_str(), TOTAL_GROSS_INCOME);
            prop_assert!(schools.contains(&r.school_name));
        }
    }

    #[test]
    fn empty_selection_is_always_empty(
        naplan in prop::collection::vec(naplan_row(), 0..30),
        income in prop::collection::vec(income_row(), 0..30),
    ) {
        let store = store(naplan, income);
        let none = SchoolSelection::default();

        prop_assert!(historical_performance(&store, &none, Choice::All).is_empty());
        prop_assert!(historical_performance(&store, &none, Choice::Only(Domain::Reading)).is_empty());
        prop_assert!(income_distribution(&store, &none).is_empty());
        prop_assert!(recurrent_income_trend(&store, &none).is_empty());
    }
}
