use eframe::egui::{Color32, Ui};
use egui_plot::{Legend, MarkerShape, Plot, PlotPoints, Points};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Listing map (central panel)
// ---------------------------------------------------------------------------

/// Scatter the matching listings by longitude/latitude, one series per room
/// type so the legend doubles as a colour key.
pub fn listing_map(ui: &mut Ui, state: &AppState) {
    let Some(dataset) = &state.dataset else {
        return;
    };

    if state.view.is_empty() {
        ui.colored_label(
            Color32::YELLOW,
            "No listings match the selected filters. Try widening your search.",
        );
        return;
    }

    Plot::new("listing_map")
        .legend(Legend::default())
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .data_aspect(1.0)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for room_type in &dataset.room_types {
                let coords: Vec<[f64; 2]> = state
                    .view
                    .rows(dataset)
                    .filter(|l| &l.room_type == room_type)
                    .map(|l| [l.longitude, l.latitude])
                    .collect();
                if coords.is_empty() {
                    continue;
                }

                let color = state
                    .color_map
                    .as_ref()
                    .map(|cm| cm.color_for(room_type))
                    .unwrap_or(Color32::LIGHT_BLUE);

                plot_ui.points(
                    Points::new(PlotPoints::from(coords))
                        .name(room_type)
                        .color(color)
                        .shape(MarkerShape::Circle)
                        .radius(2.5),
                );
            }
        });
}
