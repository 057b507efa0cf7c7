use std::hash::Hash;

use indexmap::IndexMap;

use super::spec::{
    Axis, ChartKind, ChartRows, ChartSpec, Coord, Facet, FacetDirection, Layout, Orientation, Panel, Point,
    Series,
};
use super::ChartId;
use crate::color::{discrete_colors, ColorMap, Rgb, QUALITATIVE};
use crate::data::aggregate::{HistoricalRow, RankedSchool};
use crate::data::filter::Choice;
use crate::data::model::{Domain, RecurrentIncomeRecord, INCOME_SOURCES};

/// Fixed height of the NAPLAN charts.
pub const NAPLAN_CHART_HEIGHT: u32 = 700;
/// Height given to each selected school in the income charts.
pub const PANEL_HEIGHT: u32 = 300;

/// Income charts grow with the selection but never below one panel.
pub fn selection_height(selected: usize) -> u32 {
    (PANEL_HEIGHT * selected as u32).max(PANEL_HEIGHT)
}

/// Group items by key, keeping first-appearance order of keys and items.
fn group_by<'a, T, K, F>(items: &'a [T], key: F) -> IndexMap<K, Vec<&'a T>>
where
    K: Hash + Eq,
    F: Fn(&T) -> K,
{
    let mut groups: IndexMap<K, Vec<&T>> = IndexMap::new();
    for item in items {
        groups.entry(key(item)).or_default().push(item);
    }
    groups
}

/// Assign each school a colour by first appearance, consistent across panels.
fn school_colors<'a>(schools: impl IntoIterator<Item = &'a str>) -> ColorMap {
    let names: Vec<&str> = crate::data::store::distinct(schools);
    ColorMap::new(names)
}

fn line_series(name: &str, color: Rgb, mut points: Vec<(f64, f64)>) -> Series {
    points.sort_by(|a, b| a.0.total_cmp(&b.0));
    Series {
        name: name.to_string(),
        color,
        points: points.into_iter().map(|(x, y)| Point::numeric(x, y)).collect(),
    }
}

fn empty_panel() -> Panel {
    Panel {
        label: None,
        series: Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Historical NAPLAN results
// ---------------------------------------------------------------------------

/// Line chart of score by year, one row panel per year level, one line per school.
pub fn historical_results(rows: &[HistoricalRow], domain: Choice<Domain>, has_selection: bool) -> ChartSpec {
    let colors = school_colors(rows.iter().map(|r| r.school_name.as_str()));

    let mut panels: Vec<Panel> = group_by(rows, |r| r.year_level.clone())
        .into_iter()
        .map(|(level, level_rows)| {
            let series = group_by(&level_rows, |r| r.school_name.clone())
                .into_iter()
                .map(|(school, school_rows)| {
                    line_series(
                        &school,
                        colors.color_for(&school),
                        school_rows
                            .iter()
                            .map(|r| (f64::from(r.results_year), r.avg))
                            .collect(),
                    )
                })
                .collect();
            Panel {
                label: Some(format!("year_level={level}")),
                series,
            }
        })
        .collect();
    if panels.is_empty() {
        panels.push(empty_panel());
    }

    let y_label = if domain.is_all() {
        "Average NAPLAN Score"
    } else {
        "NAPLAN Score"
    };

    ChartSpec {
        chart: ChartId::HistoricalResults,
        kind: ChartKind::Line { markers: true },
        title: Some(format!("{domain} NAPLAN Results")),
        x: Axis::new("results_year", "results_year"),
        y: Axis::new("avg", y_label),
        color_field: Some("school_name".to_string()),
        facet: Some(Facet {
            field: "year_level".to_string(),
            direction: FacetDirection::Rows,
            spacing: 0.1,
        }),
        panels,
        layout: Layout {
            height: NAPLAN_CHART_HEIGHT,
            background: if has_selection {
                Rgb::PLOT_BACKGROUND
            } else {
                Rgb::WHITE
            },
            grid: Some(Rgb::LIGHT_GRAY),
        },
        rows: ChartRows::Historical(rows.to_vec()),
    }
}

// ---------------------------------------------------------------------------
// Top schools
// ---------------------------------------------------------------------------

/// Horizontal bars, one per school, in the ranking's (ascending) order.
pub fn top_schools(ranked: &[RankedSchool]) -> ChartSpec {
    let series = if ranked.is_empty() {
        Vec::new()
    } else {
        vec![Series {
            name: "avg".to_string(),
            color: QUALITATIVE[0],
            points: ranked
                .iter()
                .map(|r| Point {
                    x: Coord::Number(r.avg),
                    y: Coord::Category(r.school_name.clone()),
                })
                .collect(),
        }]
    };

    ChartSpec {
        chart: ChartId::TopSchools,
        kind: ChartKind::Bar {
            orientation: Orientation::Horizontal,
        },
        title: Some("Top Schools by Average NAPLAN Results".to_string()),
        x: Axis::new("avg", "avg"),
        y: Axis::new("school_name", "school_name"),
        color_field: None,
        facet: None,
        panels: vec![Panel {
            label: None,
            series,
        }],
        layout: Layout {
            height: NAPLAN_CHART_HEIGHT,
            background: Rgb::PLOT_BACKGROUND,
            grid: None,
        },
        rows: ChartRows::Ranked(ranked.to_vec()),
    }
}

// ---------------------------------------------------------------------------
// Income charts
// ---------------------------------------------------------------------------

fn income_points(rows: &[&RecurrentIncomeRecord]) -> Vec<(f64, f64)> {
    rows.iter()
        .map(|r| (f64::from(r.year), r.per_student))
        .collect()
}

/// Stacked areas of funding per student, one panel per school.
///
/// Each funding source keeps the same colour in every panel and every render.
pub fn income_distribution(rows: &[RecurrentIncomeRecord], selected: usize) -> ChartSpec {
    let colors = ColorMap::new(INCOME_SOURCES);

    let mut panels: Vec<Panel> = group_by(rows, |r| r.school_name.clone())
        .into_iter()
        .map(|(school, school_rows)| {
            let by_source = group_by(&school_rows, |r| r.income_source.clone());
            let series = INCOME_SOURCES
                .iter()
                .filter_map(|source| {
                    let source_rows = by_source.get(*source)?;
                    let flat: Vec<&RecurrentIncomeRecord> = source_rows.iter().map(|r| **r).collect();
                    Some(line_series(source, colors.color_for(source), income_points(&flat)))
                })
                .collect();
            Panel {
                label: Some(school),
                series,
            }
        })
        .collect();
    if panels.is_empty() {
        panels.push(empty_panel());
    }

    ChartSpec {
        chart: ChartId::IncomeDistribution,
        kind: ChartKind::Area { stacked: true },
        title: None,
        x: Axis::new("year", "year"),
        y: Axis::new("$ per student", "$ per student"),
        color_field: Some("Net recurrent income".to_string()),
        facet: Some(Facet {
            field: "school_name".to_string(),
            direction: FacetDirection::WrappedColumns,
            spacing: 0.2,
        }),
        panels,
        layout: Layout {
            height: selection_height(selected),
            background: Rgb::PLOT_BACKGROUND,
            grid: None,
        },
        rows: ChartRows::Income(rows.to_vec()),
    }
}

/// Total gross income per student over time, one line per school.
pub fn recurrent_income(rows: &[RecurrentIncomeRecord], selected: usize) -> ChartSpec {
    let schools = group_by(rows, |r| r.school_name.clone());
    let colors = discrete_colors(schools.len());
    let series = schools
        .into_iter()
        .zip(colors)
        .map(|((school, school_rows), color)| line_series(&school, color, income_points(&school_rows)))
        .collect();

    ChartSpec {
        chart: ChartId::RecurrentIncome,
        kind: ChartKind::Line { markers: false },
        title: None,
        x: Axis::new("year", "year"),
        y: Axis::new("$ per student", "$ per student"),
        color_field: Some("school_name".to_string()),
        facet: None,
        panels: vec![Panel {
            label: None,
            series,
        }],
        layout: Layout {
            height: selection_height(selected),
            background: Rgb::PLOT_BACKGROUND,
            grid: None,
        },
        rows: ChartRows::Income(rows.to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::TOTAL_GROSS_INCOME;

    fn historical(school: &str, year: i32, level: &str, avg: f64) -> HistoricalRow {
        HistoricalRow {
            school_name: school.to_string(),
            results_year: year,
            year_level: level.to_string(),
            domain: None,
            avg,
        }
    }

    fn income(school: &str, year: i32, source: &str, amount: f64) -> RecurrentIncomeRecord {
        RecurrentIncomeRecord {
            school_name: school.to_string(),
            year,
            income_source: source.to_string(),
            per_student: amount,
        }
    }

    #[test]
    fn historical_titles_depend_on_domain() {
        let all = historical_results(&[], Choice::All, false);
        assert_eq!(all.title.as_deref(), Some("All NAPLAN Results"));
        assert_eq!(all.y.label, "Average NAPLAN Score");

        let reading = historical_results(&[], Choice::Only(Domain::Reading), true);
        assert_eq!(reading.title.as_deref(), Some("Reading NAPLAN Results"));
        assert_eq!(reading.y.label, "NAPLAN Score");
    }

    #[test]
    fn historical_background_signals_empty_selection() {
        let empty = historical_results(&[], Choice::All, false);
        assert_eq!(empty.layout.background, Rgb::WHITE);
        assert_eq!(empty.series_count(), 0);
        assert_eq!(empty.panels.len(), 1);

        let selected = historical_results(&[historical("A", 2020, "Year 5", 50.0)], Choice::All, true);
        assert_eq!(selected.layout.background, Rgb::PLOT_BACKGROUND);
        assert_eq!(selected.layout.height, NAPLAN_CHART_HEIGHT);
    }

    #[test]
    fn historical_facets_by_year_level_with_consistent_school_colors() {
        let rows = vec![
            historical("A", 2021, "Year 3", 60.0),
            historical("A", 2020, "Year 3", 55.0),
            historical("B", 2020, "Year 3", 65.0),
            historical("B", 2020, "Year 5", 70.0),
        ];
        let spec = historical_results(&rows, Choice::All, true);

        let labels: Vec<_> = spec.panels.iter().map(|p| p.label.clone()).collect();
        assert_eq!(
            labels,
            vec![
                Some("year_level=Year 3".to_string()),
                Some("year_level=Year 5".to_string())
            ]
        );

        let a = &spec.panels[0].series[0];
        assert_eq!(a.name, "A");
        assert_eq!(a.points[0], Point::numeric(2020.0, 55.0));
        assert_eq!(a.points[1], Point::numeric(2021.0, 60.0));

        let b_year_3 = &spec.panels[0].series[1];
        let b_year_5 = &spec.panels[1].series[0];
        assert_eq!(b_year_3.color, b_year_5.color);
        assert_ne!(a.color, b_year_3.color);
    }

    #[test]
    fn top_schools_keeps_ranking_order() {
        let ranked = vec![
            RankedSchool {
                school_name: "Low".to_string(),
                results_year: None,
                avg: 40.0,
            },
            RankedSchool {
                school_name: "High".to_string(),
                results_year: None,
                avg: 60.0,
            },
        ];
        let spec = top_schools(&ranked);
        let points = &spec.panels[0].series[0].points;
        assert_eq!(points[0].y.as_category(), Some("Low"));
        assert_eq!(points[1].x.as_f64(), Some(60.0));
        assert_eq!(
            spec.kind,
            ChartKind::Bar {
                orientation: Orientation::Horizontal
            }
        );
        assert_eq!(spec.rows, ChartRows::Ranked(ranked.clone()));
    }

    #[test]
    fn income_distribution_panels_are_bare_school_names_with_fixed_colors() {
        let rows = vec![
            income("B", 2020, INCOME_SOURCES[3], 500.0),
            income("A", 2020, INCOME_SOURCES[0], 9_000.0),
            income("A", 2020, INCOME_SOURCES[3], 400.0),
        ];
        let spec = income_distribution(&rows, 2);

        let labels: Vec<_> = spec.panels.iter().map(|p| p.label.as_deref()).collect();
        assert_eq!(labels, vec![Some("B"), Some("A")]);

        let other_private_b = &spec.panels[0].series[0];
        let other_private_a = &spec.panels[1].series[1];
        assert_eq!(other_private_b.name, INCOME_SOURCES[3]);
        assert_eq!(other_private_b.color, QUALITATIVE[3]);
        assert_eq!(other_private_a.color, other_private_b.color);
        assert_eq!(spec.panels[1].series[0].color, QUALITATIVE[0]);
        assert_eq!(spec.layout.height, 600);
    }

    #[test]
    fn income_charts_keep_a_minimum_height() {
        assert_eq!(selection_height(0), 300);
        assert_eq!(selection_height(1), 300);
        assert_eq!(selection_height(4), 1200);
        assert_eq!(income_distribution(&[], 0).layout.height, 300);
        assert_eq!(recurrent_income(&[], 0).layout.height, 300);
    }

    #[test]
    fn recurrent_income_has_one_line_per_school() {
        let rows = vec![
            income("A", 2021, TOTAL_GROSS_INCOME, 13_000.0),
            income("A", 2020, TOTAL_GROSS_INCOME, 12_000.0),
            income("B", 2020, TOTAL_GROSS_INCOME, 15_000.0),
        ];
        let spec = recurrent_income(&rows, 2);
        let series = &spec.panels[0].series;
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].points[0], Point::numeric(2020.0, 12_000.0));
        assert_eq!(series[1].name, "B");
    }
}
