use eframe::egui;

use crate::data::store::DatasetStore;
use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DashboardApp {
    store: DatasetStore,
    pub state: AppState,
}

impl DashboardApp {
    pub fn new(store: DatasetStore) -> Self {
        let state = AppState::new(&store);
        Self { store, state }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: brand bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &self.store);
        });

        // ---- Tabs and the active tab's filters ----
        egui::TopBottomPanel::top("filter_bar").show(ctx, |ui| {
            panels::tab_strip(ui, &mut self.state);
            ui.separator();
            panels::filter_bar(ui, &mut self.state, &self.store);
        });

        // ---- Central panel: chart ----
        egui::CentralPanel::default().show(ctx, |ui| {
            match self.state.chart(self.state.active_tab) {
                Some(spec) => plot::chart_plot(ui, spec),
                None => {
                    ui.centered_and_justified(|ui| {
                        ui.label("No chart available");
                    });
                }
            }
        });
    }
}
