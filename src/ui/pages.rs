use eframe::egui::{self, Color32, RichText, Ui};

use crate::config::BI_EMBED_URL;
use crate::state::AppState;

use super::{format, map, tables};

// ---------------------------------------------------------------------------
// Overview
// ---------------------------------------------------------------------------

pub fn overview(ui: &mut Ui, state: &AppState) {
    ui.heading("Edmonton Car Sales Insights");
    ui.label(
        RichText::new("Your data-driven hub for understanding car sales trends across Edmonton")
            .strong(),
    );
    ui.add_space(8.0);
    ui.label(
        "Explore vehicle sales across the Edmonton region with dynamic filters, \
         cluster-based mapping and dealership analytics:",
    );
    for line in [
        "Navigate car sales by location, type, make and engine",
        "Visualize dealership clusters and performance",
        "Analyze pricing, mileage and most-sold models",
        "Discover top-selling dealers and brands",
    ] {
        ui.label(format!("  •  {line}"));
    }
    ui.separator();

    ui.strong("Quick Stats");
    if state.handle.dataset().is_empty() {
        ui.label(RichText::new("The dataset has no rows.").color(Color32::YELLOW));
    }
    let stats = &state.overview;
    ui.columns(3, |cols| {
        metric(&mut cols[0], "Total Vehicles", &format::count(stats.total_vehicles));
        metric(&mut cols[1], "Avg. Price", &format::currency(stats.avg_price));
        metric(&mut cols[2], "Most Common Make", &stats.top_make);
    });
    ui.add_space(8.0);
    ui.label(
        RichText::new("Head to the 'Model' page to explore clusters and interactive mapping.")
            .color(Color32::LIGHT_GREEN),
    );
    ui.label(
        RichText::new(
            "Use the filters on the 'Model' page to focus on specific makes, \
             price ranges or regions.",
        )
        .color(Color32::LIGHT_BLUE),
    );
}

fn metric(ui: &mut Ui, title: &str, value: &str) {
    ui.vertical(|ui| {
        ui.label(title);
        ui.label(RichText::new(value).size(26.0).strong());
    });
}

// ---------------------------------------------------------------------------
// Analysis: the BI report lives outside the app
// ---------------------------------------------------------------------------

pub fn analysis(ui: &mut Ui) {
    ui.heading("Analysis");
    ui.label("Visual and statistical analysis of car sales data.");
    ui.separator();
    ui.strong("Power BI Dashboard Insight");
    ui.label("Explore interactive charts and sales statistics in the Power BI dashboard.");
    ui.hyperlink_to("Open the Power BI dashboard", BI_EMBED_URL);
    ui.label(RichText::new(BI_EMBED_URL).monospace().small().weak());
}

// ---------------------------------------------------------------------------
// Model: cluster overview and regional map
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CenterTab {
    #[default]
    Clusters,
    Map,
}

/// Column visibility toggles. Returns `true` when the filter toggle changed,
/// since that changes which filters apply.
pub fn model_toggles(ui: &mut Ui, state: &mut AppState) -> bool {
    let mut changed = false;
    ui.horizontal(|ui| {
        ui.strong("Toggle Column Visibility:");
        changed = ui.checkbox(&mut state.show_filters, "<< Show Filters").changed();
        ui.checkbox(&mut state.show_tables, ">> Show Tables");
    });
    changed
}

pub fn model_center(ui: &mut Ui, state: &mut AppState, tab: &mut CenterTab) {
    ui.heading("Clustering Model Dashboard");
    ui.horizontal(|ui| {
        ui.selectable_value(tab, CenterTab::Clusters, "Cluster Overview");
        ui.selectable_value(tab, CenterTab::Map, "Regional Map");
    });
    ui.separator();

    match tab {
        CenterTab::Clusters => {
            ui.strong("Cluster Overview & Selection");
            let toggled = egui::ScrollArea::horizontal()
                .show(ui, |ui| tables::cluster_table(ui, state))
                .inner;
            if let Some(cluster) = toggled {
                state.toggle_cluster(cluster);
            }
            ui.add_space(12.0);
            tables::selection_kpis(ui, state);
        }
        CenterTab::Map => {
            ui.strong("Clustered Regional Map");
            let search = ui.add(
                egui::TextEdit::singleline(&mut state.region_query)
                    .hint_text("Search Region (e.g., North, South)"),
            );
            if search.changed() {
                state.refresh();
            }
            ui.label(format!("{} regions plotted", state.view.map_points.len()));
            map::regional_map(ui, &state.view.markers);
        }
    }
}

// ---------------------------------------------------------------------------
// About
// ---------------------------------------------------------------------------

pub fn about(ui: &mut Ui) {
    ui.heading("About");
    ui.label(
        "Vehicle sales are grouped into pre-computed clusters; this dashboard \
         filters them and summarises each cluster, region, dealer and model.",
    );
    ui.label(format!("{} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")));
}
