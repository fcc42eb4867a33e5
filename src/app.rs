use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RustySalaryApp {
    pub state: AppState,
}

impl eframe::App for RustySalaryApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: grouping and filter ----
        egui::SidePanel::left("control_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::control_panel(ui, &mut self.state);
            });

        // ---- Right side panel: outliers / top earners ----
        egui::SidePanel::right("highlight_panel")
            .default_width(380.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::highlight_panel(ui, &self.state);
            });

        // ---- Bottom panel: loaded rows ----
        egui::TopBottomPanel::bottom("preview_panel")
            .default_height(200.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::preview_panel(ui, &self.state);
            });

        // ---- Central panel: box plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::salary_plot(ui, &self.state);
        });
    }
}
