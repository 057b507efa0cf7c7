use serde::Serialize;

use super::ChartId;
use crate::color::Rgb;
use crate::data::aggregate::{HistoricalRow, RankedSchool};
use crate::data::model::RecurrentIncomeRecord;

/// A declarative description of one chart, independent of any renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub chart: ChartId,
    pub kind: ChartKind,
    pub title: Option<String>,
    pub x: Axis,
    pub y: Axis,
    /// Field whose values pick each series' colour.
    pub color_field: Option<String>,
    pub facet: Option<Facet>,
    /// One panel per facet value, or a single unlabelled panel.
    pub panels: Vec<Panel>,
    pub layout: Layout,
    /// The aggregation output the panels were built from.
    pub rows: ChartRows,
}

impl ChartSpec {
    /// Total number of data points across all panels.
    pub fn point_count(&self) -> usize {
        self.panels
            .iter()
            .flat_map(|p| &p.series)
            .map(|s| s.points.len())
            .sum()
    }

    pub fn series_count(&self) -> usize {
        self.panels.iter().map(|p| p.series.len()).sum()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Result table of one aggregation, exported alongside the drawn panels.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChartRows {
    Historical(Vec<HistoricalRow>),
    Ranked(Vec<RankedSchool>),
    Income(Vec<RecurrentIncomeRecord>),
}

impl ChartRows {
    pub fn len(&self) -> usize {
        match self {
            ChartRows::Historical(rows) => rows.len(),
            ChartRows::Ranked(rows) => rows.len(),
            ChartRows::Income(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartKind {
    Line { markers: bool },
    Bar { orientation: Orientation },
    Area { stacked: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Axis {
    /// Source column plotted on this axis.
    pub field: String,
    pub label: String,
}

impl Axis {
    pub fn new(field: &str, label: &str) -> Self {
        Axis {
            field: field.to_string(),
            label: label.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FacetDirection {
    /// Panels stacked top to bottom, one row each.
    Rows,
    /// Panels laid out as columns wrapped after one, which also stacks them.
    WrappedColumns,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Facet {
    pub field: String,
    pub direction: FacetDirection,
    /// Gap between panels as a fraction of the plot height.
    pub spacing: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub label: Option<String>,
    pub series: Vec<Series>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub color: Rgb,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Coord {
    Number(f64),
    Category(String),
}

impl Coord {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Coord::Number(v) => Some(*v),
            Coord::Category(_) => None,
        }
    }

    pub fn as_category(&self) -> Option<&str> {
        match self {
            Coord::Number(_) => None,
            Coord::Category(c) => Some(c),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub x: Coord,
    pub y: Coord,
}

impl Point {
    pub fn numeric(x: f64, y: f64) -> Self {
        Point {
            x: Coord::Number(x),
            y: Coord::Number(y),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    /// Total height in pixels, shared between panels.
    pub height: u32,
    pub background: Rgb,
    pub grid: Option<Rgb>,
}
