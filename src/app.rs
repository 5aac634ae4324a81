use eframe::egui;

use crate::state::AppState;
use crate::ui::{charts, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct RustyTracksApp {
    pub state: AppState,
}

impl RustyTracksApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for RustyTracksApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: clicked track ----
        egui::TopBottomPanel::bottom("detail_panel")
            .resizable(true)
            .default_height(180.0)
            .show(ctx, |ui| {
                panels::detail_panel(ui, &self.state.detail);
            });

        // ---- Central panel: charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(controller) = &self.state.controller else {
                ui.centered_and_justified(|ui| {
                    ui.heading("Open a track file to explore it  (File → Open…)");
                });
                return;
            };
            let clicked = charts::chart_grid(ui, controller.frame(), &self.state.colors);
            if let Some(payload) = clicked {
                self.state.click(&payload);
            }
        });
    }
}
