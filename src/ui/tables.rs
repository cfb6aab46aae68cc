use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::color::cluster_color;
use crate::data::aggregate::TopModels;
use crate::state::AppState;

use super::format;

const ROW_HEIGHT: f32 = 20.0;
const KPI_COLOR: Color32 = Color32::from_rgb(0xFF, 0x63, 0x47);

// ---------------------------------------------------------------------------
// Cluster overview with selection checkboxes
// ---------------------------------------------------------------------------

/// Render the cluster table. Returns the cluster whose checkbox was toggled.
pub fn cluster_table(ui: &mut Ui, state: &AppState) -> Option<u32> {
    let mut toggled = None;
    let headers = [
        "Cluster",
        "Top Region",
        "Top Type",
        "Avg Price",
        "Avg Mileage",
        "Vehicles Sold",
        "Top Model (Count)",
    ];

    ui.push_id("cluster_table", |ui| {
        TableBuilder::new(ui)
            .striped(true)
            .column(Column::auto().at_least(70.0))
            .columns(Column::auto().at_least(80.0), headers.len() - 2)
            .column(Column::remainder())
            .header(ROW_HEIGHT, |mut header| {
                for h in headers {
                    header.col(|ui| {
                        ui.strong(h);
                    });
                }
            })
            .body(|mut body| {
                for row in &state.view.cluster_summary {
                    body.row(ROW_HEIGHT, |mut cells| {
                        cells.col(|ui| {
                            let mut checked = state.selected_clusters.contains(&row.cluster);
                            let label = RichText::new(row.cluster.to_string())
                                .color(cluster_color(row.cluster).color);
                            let regions = state
                                .view
                                .cluster_regions
                                .get(&row.cluster)
                                .map(|r| r.join(", "))
                                .unwrap_or_else(|| "Region Info Not Available".to_string());
                            if ui
                                .checkbox(&mut checked, label)
                                .on_hover_text(format!("Includes: {regions}"))
                                .changed()
                            {
                                toggled = Some(row.cluster);
                            }
                        });
                        cells.col(|ui| {
                            ui.label(row.top_region.as_str());
                        });
                        cells.col(|ui| {
                            ui.label(row.top_type.as_str());
                        });
                        cells.col(|ui| {
                            ui.label(format::currency(row.avg_price));
                        });
                        cells.col(|ui| {
                            ui.label(format::rounded(row.avg_mileage));
                        });
                        cells.col(|ui| {
                            ui.label(format::count(row.vehicles_sold));
                        });
                        cells.col(|ui| {
                            ui.label(row.top_model_label());
                        });
                    });
                }
            });
    });

    toggled
}

/// Two headline numbers for the current cluster selection.
pub fn selection_kpis(ui: &mut Ui, state: &AppState) {
    let kpis = &state.view.kpis;
    ui.columns(2, |cols| {
        kpi(&mut cols[0], "Total Vehicles Sold", &format::count(kpis.total_vehicles));
        kpi(&mut cols[1], "Top Make", &kpis.top_make);
    });
}

fn kpi(ui: &mut Ui, title: &str, value: &str) {
    ui.vertical_centered(|ui| {
        ui.strong(title);
        ui.label(RichText::new(value).size(28.0).color(KPI_COLOR));
    });
}

// ---------------------------------------------------------------------------
// Right column: top dealers / top models
// ---------------------------------------------------------------------------

pub fn top_dealers(ui: &mut Ui, state: &AppState) {
    ui.push_id("top_dealers", |ui| {
        TableBuilder::new(ui)
            .striped(true)
            .column(Column::auto())
            .column(Column::remainder().at_least(120.0))
            .columns(Column::auto(), 3)
            .header(ROW_HEIGHT, |mut header| {
                for h in ["#", "Dealer", "Count", "Top Make", "Avg Mileage"] {
                    header.col(|ui| {
                        ui.strong(h);
                    });
                }
            })
            .body(|mut body| {
                for row in &state.view.top_dealers {
                    body.row(ROW_HEIGHT, |mut cells| {
                        cells.col(|ui| {
                            ui.label(row.rank.to_string());
                        });
                        cells.col(|ui| {
                            ui.label(row.dealer_name.as_str());
                        });
                        cells.col(|ui| {
                            ui.label(format::count(row.count));
                        });
                        cells.col(|ui| {
                            ui.label(row.top_make.as_str());
                        });
                        cells.col(|ui| {
                            ui.label(format::rounded(row.avg_mileage));
                        });
                    });
                }
            });
    });
}

pub fn top_models(ui: &mut Ui, state: &AppState) {
    let rows = match &state.view.top_models {
        TopModels::Ranked(rows) => rows,
        TopModels::NoData => {
            ui.label(
                RichText::new("No data available for the selected filters.")
                    .color(Color32::YELLOW),
            );
            return;
        }
    };

    ui.push_id("top_models", |ui| {
        TableBuilder::new(ui)
            .striped(true)
            .column(Column::auto())
            .columns(Column::remainder().at_least(80.0), 2)
            .column(Column::auto())
            .header(ROW_HEIGHT, |mut header| {
                for h in ["#", "Make", "Model", "Count"] {
                    header.col(|ui| {
                        ui.strong(h);
                    });
                }
            })
            .body(|mut body| {
                for row in rows {
                    body.row(ROW_HEIGHT, |mut cells| {
                        cells.col(|ui| {
                            ui.label(row.rank.to_string());
                        });
                        cells.col(|ui| {
                            ui.label(row.make.as_str());
                        });
                        cells.col(|ui| {
                            ui.label(row.model.as_str());
                        });
                        cells.col(|ui| {
                            ui.label(format::count(row.count));
                        });
                    });
                }
            });
    });
}

/// Tabbed right column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SideTab {
    #[default]
    Dealers,
    Models,
}

pub fn side_tables(ui: &mut Ui, state: &AppState, tab: &mut SideTab) {
    ui.horizontal(|ui| {
        ui.selectable_value(tab, SideTab::Dealers, "Top Dealerships");
        ui.selectable_value(tab, SideTab::Models, "Most Sold Models");
    });
    ui.separator();
    egui::ScrollArea::horizontal().show(ui, |ui| match tab {
        SideTab::Dealers => top_dealers(ui, state),
        SideTab::Models => top_models(ui, state),
    });
}
