use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::config::PRICE_BOUNDS;
use crate::data::model::Category;
use crate::state::{AppState, Page};

// ---------------------------------------------------------------------------
// Navigation sidebar
// ---------------------------------------------------------------------------

pub fn navigation(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Navigation");
    ui.separator();
    for page in Page::ALL {
        ui.radio_value(&mut state.page, page, page.label());
    }
}

// ---------------------------------------------------------------------------
// Filter column (Model page)
// ---------------------------------------------------------------------------

/// Render the filter widgets. Returns `true` when any value changed.
pub fn filter_panel(ui: &mut Ui, state: &mut AppState) -> bool {
    ui.heading("Additional Filters");
    ui.separator();

    let dataset = state.handle.dataset().clone();
    let mut changed = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for category in Category::ALL {
                let options = dataset.options.values(category);
                let selected = state.panel.selection_mut(category);

                // An empty selection filters nothing.
                let header_text = if selected.is_empty() {
                    format!("{category}  (any)")
                } else {
                    format!("{category}  ({}/{})", selected.len(), options.len())
                };

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(category.label())
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        if ui.small_button("Clear").clicked() && !selected.is_empty() {
                            selected.clear();
                            changed = true;
                        }
                        for value in options {
                            let mut checked = selected.contains(value);
                            if ui.checkbox(&mut checked, value.as_str()).changed() {
                                if checked {
                                    selected.insert(value.clone());
                                } else {
                                    selected.remove(value);
                                }
                                changed = true;
                            }
                        }
                    });
            }

            ui.separator();
            ui.strong("Price Range");
            let (lo, hi) = PRICE_BOUNDS;
            let price = &mut state.panel.price;
            changed |= ui
                .add(
                    egui::Slider::new(&mut price.min, lo..=hi)
                        .text("min")
                        .prefix("$")
                        .step_by(500.0),
                )
                .changed();
            changed |= ui
                .add(
                    egui::Slider::new(&mut price.max, lo..=hi)
                        .text("max")
                        .prefix("$")
                        .step_by(500.0),
                )
                .changed();
            if price.min > price.max {
                ui.label(
                    RichText::new("Minimum is above maximum: nothing matches.")
                        .color(Color32::YELLOW),
                );
            }

            ui.separator();
            changed |= ui
                .checkbox(&mut state.panel.exclude_autocanada, "Exclude AutoCanada")
                .changed();
        });

    changed
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
            if ui.button("Reload").clicked() {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{} sales loaded from {}, {} match the filters",
            state.handle.dataset().len(),
            state.handle.source(),
            state.view.filtered_count
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open sales data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open_file(path);
    }
}
