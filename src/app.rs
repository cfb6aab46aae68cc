use eframe::egui;

use crate::state::{AppState, Page};
use crate::ui::pages::{self, CenterTab};
use crate::ui::panels;
use crate::ui::tables::{self, SideTab};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct CarSalesApp {
    pub state: AppState,
    center_tab: CenterTab,
    side_tab: SideTab,
}

impl CarSalesApp {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            center_tab: CenterTab::default(),
            side_tab: SideTab::default(),
        }
    }
}

impl eframe::App for CarSalesApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: page navigation ----
        egui::SidePanel::left("navigation")
            .default_width(140.0)
            .resizable(false)
            .show(ctx, |ui| {
                panels::navigation(ui, &mut self.state);
            });

        if self.state.page != Page::Model {
            egui::CentralPanel::default().show(ctx, |ui| match self.state.page {
                Page::Overview => pages::overview(ui, &self.state),
                Page::Analysis => pages::analysis(ui),
                Page::About => pages::about(ui),
                Page::Model => {}
            });
            return;
        }

        // ---- Model page ----
        egui::TopBottomPanel::top("model_toggles").show(ctx, |ui| {
            if pages::model_toggles(ui, &mut self.state) {
                self.state.refresh();
            }
        });

        if self.state.show_filters {
            egui::SidePanel::left("filter_panel")
                .default_width(220.0)
                .resizable(true)
                .show(ctx, |ui| {
                    if panels::filter_panel(ui, &mut self.state) {
                        self.state.refresh();
                    }
                });
        }

        if self.state.show_tables {
            egui::SidePanel::right("tables_panel")
                .default_width(320.0)
                .resizable(true)
                .show(ctx, |ui| {
                    tables::side_tables(ui, &self.state, &mut self.side_tab);
                });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            pages::model_center(ui, &mut self.state, &mut self.center_tab);
        });
    }
}
