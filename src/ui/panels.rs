use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::{AppState, Facet};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Search filters");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            facet_filter(ui, state, Facet::Neighbourhood, "Neighbourhoods", false);
            facet_filter(ui, state, Facet::RoomType, "Room types", true);
            ui.separator();
            price_filter(ui, state);
        });
}

/// Collapsible checklist for one categorical facet.
fn facet_filter(ui: &mut Ui, state: &mut AppState, facet: Facet, title: &str, open: bool) {
    let options = state.options(facet);
    let n_selected = options
        .iter()
        .filter(|v| state.is_selected(facet, v))
        .count();
    let header_text = format!("{title}  ({n_selected}/{})", options.len());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(title)
        .default_open(open)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all(facet);
                }
                if ui.small_button("None").clicked() {
                    state.select_none(facet);
                }
            });

            for value in &options {
                let mut text = RichText::new(value);
                if facet == Facet::RoomType {
                    if let Some(cm) = &state.color_map {
                        text = text.color(cm.color_for(value));
                    }
                }

                let mut checked = state.is_selected(facet, value);
                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle(facet, value);
                }
            }
        });
}

/// Inclusive price range, defaulting to the dataset's bounds.
fn price_filter(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Price range (per night)");

    let bounds = state.bounds;
    // Keep values selected past the default upper bound reachable.
    let upper = bounds.max.max(state.criteria.max_price);
    let mut min = state.criteria.min_price;
    let mut max = state.criteria.max_price;

    let min_changed = ui
        .add(egui::Slider::new(&mut min, bounds.min..=upper).text("min"))
        .changed();
    let max_changed = ui
        .add(egui::Slider::new(&mut max, bounds.min..=upper).text("max"))
        .changed();

    if min_changed || max_changed {
        state.set_price_range(min, max);
    }

    if ui.small_button("Reset").clicked() {
        state.set_price_range(bounds.min, bounds.max);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let can_export = state.dataset.is_some() && !state.view.is_empty();
            if ui
                .add_enabled(can_export, egui::Button::new("Export filtered…"))
                .clicked()
            {
                export_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} listings loaded, {} matching",
                ds.len(),
                state.view.count
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(msg);
        }
    });
}

// ---------------------------------------------------------------------------
// Summary metrics
// ---------------------------------------------------------------------------

/// Listing count and mean price of the current view.
pub fn metrics(ui: &mut Ui, state: &AppState) {
    ui.columns(2, |cols: &mut [Ui]| {
        cols[0].label("Listings found");
        cols[0].heading(format_count(state.view.count));
        cols[1].label("Average price per night");
        cols[1].heading(format!("{:.2}", state.view.mean_price));
    });
}

/// Blocking error shown instead of the dashboard when loading failed.
pub fn load_error(ui: &mut Ui, message: &str) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.label(
            RichText::new(format!(
                "{message}\n\nOpen a listings file with File → Open…"
            ))
            .color(Color32::RED)
            .heading(),
        );
    });
}

/// `12345` → `"12,345"`.
fn format_count(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open listings")
        .add_filter("Supported files", &["gz", "csv", "parquet", "pq"])
        .add_filter("Gzip CSV", &["gz"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load(path);
    }
}

pub fn export_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export filtered listings")
        .add_filter("CSV", &["csv"])
        .set_file_name("filtered_listings.csv")
        .save_file();

    if let Some(path) = file {
        state.status_message = Some(match state.export_filtered(&path) {
            Ok(n) => {
                log::info!("Exported {n} listings to {}", path.display());
                format!("Exported {n} listings")
            }
            Err(e) => {
                log::error!("Export failed: {e:#}");
                format!("Export failed: {e:#}")
            }
        });
    }
}
