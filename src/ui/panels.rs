use std::fmt::Display;

use eframe::egui::{self, RichText, ScrollArea, Ui};

use crate::chart::ChartId;
use crate::data::filter::{Choice, FilterState, SchoolSelection, ALL_LABEL};
use crate::data::model::Domain;
use crate::data::store::DatasetStore;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Brand and dataset summary.
pub fn top_bar(ui: &mut Ui, store: &DatasetStore) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.label(RichText::new("Historical NAPLAN Performance").strong().size(16.0));
        ui.separator();
        ui.label(format!(
            "{} NAPLAN results, {} income rows, {} enrolment rows",
            store.naplan_results().len(),
            store.recurrent_income().len(),
            store.enrolments().len()
        ));
    });
}

// ---------------------------------------------------------------------------
// Tabs
// ---------------------------------------------------------------------------

pub fn tab_strip(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        for id in ChartId::ALL {
            ui.selectable_value(&mut state.active_tab, id, id.tab_label());
        }
    });
}

// ---------------------------------------------------------------------------
// Filter widgets for the active tab
// ---------------------------------------------------------------------------

/// A selection change collected while drawing, applied once drawing is done.
enum FilterAction {
    ToggleSchool(String),
    ClearSchools,
    Domain(Choice<Domain>),
    Year(Choice<i32>),
    Skill(Choice<Domain>),
}

pub fn filter_bar(ui: &mut Ui, state: &mut AppState, store: &DatasetStore) {
    let chart = state.active_tab;
    let Some(filters) = state.filters(chart).cloned() else {
        return;
    };
    let options = state.options.clone();
    let mut actions = Vec::new();

    ui.horizontal_wrapped(|ui: &mut Ui| match &filters {
        FilterState::HistoricalResults { schools, domain } => {
            ui.label("Domain");
            if let Some(choice) = choice_dropdown(ui, "result_domain", *domain, &options.domains) {
                actions.push(FilterAction::Domain(choice));
            }
            school_dropdown(ui, chart, schools, options.schools_for(chart), &mut actions);
        }
        FilterState::TopSchools { year, skill } => {
            ui.label("Skill");
            if let Some(choice) = choice_dropdown(ui, "top_n_skill", *skill, &Domain::ALL) {
                actions.push(FilterAction::Skill(choice));
            }
            ui.label("Year");
            if let Some(choice) = choice_dropdown(ui, "results_year", *year, &options.results_years) {
                actions.push(FilterAction::Year(choice));
            }
        }
        FilterState::RecurrentIncome { schools } | FilterState::IncomeDistribution { schools } => {
            school_dropdown(ui, chart, schools, options.schools_for(chart), &mut actions);
        }
    });

    for action in actions {
        match action {
            FilterAction::ToggleSchool(school) => state.toggle_school(store, chart, &school),
            FilterAction::ClearSchools => state.clear_schools(store, chart),
            FilterAction::Domain(choice) => state.set_domain(store, choice),
            FilterAction::Year(choice) => state.set_year(store, choice),
            FilterAction::Skill(choice) => state.set_skill(store, choice),
        }
    }
}

/// Single-select dropdown with a leading "All" entry.
fn choice_dropdown<T>(ui: &mut Ui, id: &str, current: Choice<T>, values: &[T]) -> Option<Choice<T>>
where
    T: Copy + PartialEq + Display,
{
    let mut selected = current;
    egui::ComboBox::from_id_salt(id)
        .selected_text(current.to_string())
        .show_ui(ui, |ui: &mut Ui| {
            ui.selectable_value(&mut selected, Choice::All, ALL_LABEL);
            for value in values {
                ui.selectable_value(&mut selected, Choice::Only(*value), value.to_string());
            }
        });
    (selected != current).then_some(selected)
}

/// Multi-select of school names with a clear button.
fn school_dropdown(
    ui: &mut Ui,
    chart: ChartId,
    selected: &SchoolSelection,
    schools: &[String],
    actions: &mut Vec<FilterAction>,
) {
    let summary = match selected.len() {
        0 => "Select schools…".to_string(),
        1 => selected.iter().next().unwrap_or_default().to_string(),
        n => format!("{n} schools selected"),
    };

    ui.label("Schools");
    egui::ComboBox::from_id_salt(("schools", chart.as_str()))
        .width(320.0)
        .selected_text(summary)
        .show_ui(ui, |ui: &mut Ui| {
            ScrollArea::vertical()
                .max_height(320.0_f32)
                .show(ui, |ui: &mut Ui| {
                    for school in schools {
                        let mut checked = selected.contains(school);
                        if ui.checkbox(&mut checked, school.as_str()).changed() {
                            actions.push(FilterAction::ToggleSchool(school.clone()));
                        }
                    }
                });
        });

    if ui
        .add_enabled(!selected.is_empty(), egui::Button::new("Clear"))
        .clicked()
    {
        actions.push(FilterAction::ClearSchools);
    }
}
