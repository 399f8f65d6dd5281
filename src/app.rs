use eframe::egui;

use crate::config::DashboardConfig;
use crate::state::AppState;
use crate::ui::{map, panels, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct RentalExplorerApp {
    pub state: AppState,
}

impl RentalExplorerApp {
    /// Build the app and load the configured listings file.
    pub fn new(config: DashboardConfig) -> Self {
        let mut state = AppState::new(config);
        state.load(state.data_path.clone());
        Self { state }
    }
}

impl eframe::App for RentalExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: metrics, map, table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(message) = &self.state.load_error {
                panels::load_error(ui, message);
                return;
            }

            ui.heading("Search results");
            panels::metrics(ui, &self.state);
            ui.separator();

            ui.heading("Listing details");
            table::listing_table(ui, &self.state);
            ui.separator();

            ui.heading("Listing locations");
            map::listing_map(ui, &self.state);
        });
    }
}
