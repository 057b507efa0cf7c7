use std::ops::RangeInclusive;

use eframe::egui::{self, RichText, ScrollArea, Ui};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotUi, Points};

use super::to_color32;
use crate::chart::spec::{ChartKind, ChartSpec, Orientation, Panel, Series};

// ---------------------------------------------------------------------------
// Chart (central panel)
// ---------------------------------------------------------------------------

/// Draw a chart spec: title, then one plot per panel stacked vertically.
pub fn chart_plot(ui: &mut Ui, spec: &ChartSpec) {
    if let Some(title) = &spec.title {
        ui.heading(title);
    }

    let panel_count = spec.panels.len().max(1);
    let panel_height = spec.layout.height as f32 / panel_count as f32;
    let gap = spec.facet.as_ref().map_or(0.0, |f| f.spacing * panel_height);

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (index, panel) in spec.panels.iter().enumerate() {
                if index > 0 {
                    ui.add_space(gap);
                }
                if let Some(label) = &panel.label {
                    ui.label(RichText::new(label).strong());
                }
                egui::Frame::default()
                    .fill(to_color32(spec.layout.background))
                    .show(ui, |ui: &mut Ui| {
                        panel_plot(ui, spec, index, panel, panel_height - gap);
                    });
            }
        });
}

fn panel_plot(ui: &mut Ui, spec: &ChartSpec, index: usize, panel: &Panel, height: f32) {
    let mut plot = Plot::new(("chart", spec.chart.as_str(), index))
        .height(height.max(120.0))
        .legend(Legend::default())
        .x_axis_label(spec.x.label.clone())
        .y_axis_label(spec.y.label.clone())
        .show_background(false)
        .show_grid(spec.layout.grid.is_some());

    if let ChartKind::Bar { orientation } = spec.kind {
        let categories = bar_categories(panel, orientation);
        let label = move |mark: GridMark, _range: &RangeInclusive<f64>| category_label(&categories, mark.value);
        plot = match orientation {
            Orientation::Horizontal => plot.y_axis_formatter(label),
            Orientation::Vertical => plot.x_axis_formatter(label),
        };
    }

    plot.show(ui, |plot_ui| match spec.kind {
        ChartKind::Line { markers } => {
            for series in &panel.series {
                line(plot_ui, series, markers);
            }
        }
        ChartKind::Bar { orientation } => {
            for series in &panel.series {
                bars(plot_ui, series, orientation);
            }
        }
        ChartKind::Area { stacked } => stacked_areas(plot_ui, &panel.series, stacked),
    });
}

/// Category of each bar, in drawing order. The category sits on the axis the
/// bars grow out of.
fn bar_categories(panel: &Panel, orientation: Orientation) -> Vec<String> {
    panel
        .series
        .iter()
        .flat_map(|s| &s.points)
        .filter_map(|p| match orientation {
            Orientation::Horizontal => p.y.as_category(),
            Orientation::Vertical => p.x.as_category(),
        })
        .map(str::to_string)
        .collect()
}

/// Label of the category bar sitting exactly at `value`, if any.
fn category_label(categories: &[String], value: f64) -> String {
    if value.fract() != 0.0 || value < 0.0 {
        return String::new();
    }
    categories
        .get(value as usize)
        .cloned()
        .unwrap_or_default()
}

fn numeric_points(series: &Series) -> Vec<[f64; 2]> {
    series
        .points
        .iter()
        .filter_map(|p| Some([p.x.as_f64()?, p.y.as_f64()?]))
        .collect()
}

fn line(plot_ui: &mut PlotUi, series: &Series, markers: bool) {
    let color = to_color32(series.color);
    let points = numeric_points(series);
    if markers {
        plot_ui.points(
            Points::new(points.clone())
                .name(&series.name)
                .color(color)
                .radius(3.0_f32),
        );
    }
    plot_ui.line(Line::new(points).name(&series.name).color(color).width(1.5_f32));
}

fn bars(plot_ui: &mut PlotUi, series: &Series, orientation: Orientation) {
    let color = to_color32(series.color);
    let bars: Vec<Bar> = series
        .points
        .iter()
        .enumerate()
        .filter_map(|(i, p)| {
            let (category, value) = match orientation {
                Orientation::Horizontal => (&p.y, &p.x),
                Orientation::Vertical => (&p.x, &p.y),
            };
            let name = category.as_category().unwrap_or_default();
            Some(Bar::new(i as f64, value.as_f64()?).name(name).fill(color))
        })
        .collect();
    let chart = BarChart::new(bars).color(color).name(&series.name);
    plot_ui.bar_chart(match orientation {
        Orientation::Horizontal => chart.horizontal(),
        Orientation::Vertical => chart.vertical(),
    });
}

/// Draw area series; when stacked, each series sits on top of the previous.
fn stacked_areas(plot_ui: &mut PlotUi, series: &[Series], stacked: bool) {
    let mut xs: Vec<f64> = series
        .iter()
        .flat_map(numeric_points)
        .map(|[x, _]| x)
        .collect();
    xs.sort_by(|a, b| a.total_cmp(b));
    xs.dedup();

    let mut baseline = vec![0.0; xs.len()];
    let mut layers = Vec::with_capacity(series.len());
    for s in series {
        let values = numeric_points(s);
        let tops: Vec<[f64; 2]> = xs
            .iter()
            .zip(baseline.iter_mut())
            .map(|(x, base)| {
                let y: f64 = values.iter().filter(|[px, _]| px == x).map(|[_, py]| py).sum();
                let top = if stacked { *base + y } else { y };
                if stacked {
                    *base = top;
                }
                [*x, top]
            })
            .collect();
        layers.push((s, tops));
    }

    // Highest layer first so lower fills are painted over it.
    for (s, tops) in layers.into_iter().rev() {
        plot_ui.line(
            Line::new(tops)
                .name(&s.name)
                .color(to_color32(s.color))
                .fill(0.0_f32)
                .width(1.5_f32),
        );
    }
}
