use eframe::egui;

use crate::state::AppState;
use crate::ui::panels;
use data_sweeper::SweeperConfig;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DataSweeperApp {
    pub state: AppState,
}

impl DataSweeperApp {
    pub fn new(config: SweeperConfig) -> Self {
        Self {
            state: AppState::new(config),
        }
    }
}

impl eframe::App for DataSweeperApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar + batch status ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Central panel: one card per uploaded file ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Data Sweeper");
            ui.label("Convert files between CSV and Excel with built-in cleaning tools.");
            ui.separator();
            panels::file_cards(ui, &mut self.state);
        });
    }
}
