use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::state::AppState;

const HEADERS: [&str; 6] = [
    "Name",
    "Neighbourhood",
    "Room type",
    "Price",
    "Rating",
    "Accommodates",
];

/// Detail table of the first matching listings.
pub fn listing_table(ui: &mut Ui, state: &AppState) {
    if state.view.is_empty() {
        ui.label("The table will appear here once listings match the filters.");
        return;
    }

    let rows = state.table_rows();
    if rows.len() < state.view.count {
        ui.weak(format!(
            "Showing the first {} of {} listings",
            rows.len(),
            state.view.count
        ));
    }

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .max_scroll_height(300.0)
        .column(Column::remainder().at_least(160.0).clip(true))
        .columns(Column::auto().at_least(80.0), HEADERS.len() - 1)
        .header(20.0, |mut header| {
            for title in HEADERS {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, rows.len(), |mut row| {
                let listing = rows[row.index()];
                row.col(|ui| {
                    ui.label(&listing.name);
                });
                row.col(|ui| {
                    ui.label(&listing.neighbourhood);
                });
                row.col(|ui| {
                    ui.label(&listing.room_type);
                });
                row.col(|ui| {
                    ui.label(format!("{:.2}", listing.price));
                });
                row.col(|ui| {
                    ui.label(format!("{:.2}", listing.review_scores_rating));
                });
                row.col(|ui| {
                    ui.label(listing.accommodates.to_string());
                });
            });
        });
}
