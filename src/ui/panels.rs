use eframe::egui::{self, Color32, RichText, Ui};

use crate::state::{AppState, Notice, save_artifact};
use crate::ui::{plot, preview};
use data_sweeper::{ConversionTarget, Stage};

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Upload…").clicked() {
                open_files_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(batch) = &state.batch {
            ui.label(format!("{} files loaded", batch.len()));
            ui.separator();
        }

        if let Some(msg) = &state.status_message {
            let colour = if state.upload_failed { Color32::RED } else { Color32::GREEN };
            ui.label(RichText::new(msg).color(colour));
        }
    });
}

// ---------------------------------------------------------------------------
// File cards (central panel)
// ---------------------------------------------------------------------------

/// Render every file of the current batch, one collapsible card each.
pub fn file_cards(ui: &mut Ui, state: &mut AppState) {
    let Some(batch) = &state.batch else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Upload CSV or Excel files to start  (File → Upload…)");
        });
        return;
    };

    let names: Vec<String> = batch
        .sessions()
        .iter()
        .map(|s| s.file_name().to_string())
        .collect();

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (index, name) in names.iter().enumerate() {
                egui::CollapsingHeader::new(RichText::new(name).heading())
                    .id_salt(("file", index))
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| file_card(ui, state, index));
                ui.separator();
            }
        });
}

fn file_card(ui: &mut Ui, state: &mut AppState, index: usize) {
    let Some(session) = state.batch.as_ref().and_then(|b| b.sessions().get(index)) else {
        return;
    };

    if session.stage() == Stage::Failed {
        let reason = session.failure().unwrap_or("unknown error");
        ui.label(RichText::new(format!("Error reading {}: {reason}", session.file_name())).color(Color32::RED));
        return;
    }

    // ---- Preview ----
    ui.strong("Preview");
    if let Ok(head) = session.head(state.config.preview_rows) {
        preview::table_grid(ui, index, &head);
    }
    ui.add_space(6.0);

    // ---- Cleaning ----
    ui.strong("Data cleaning");
    let view = &mut state.views[index];
    ui.checkbox(&mut view.cleaning_enabled, "Enable cleaning");
    if view.cleaning_enabled {
        ui.horizontal(|ui: &mut Ui| {
            if ui.button("Remove duplicates").clicked() {
                state.remove_duplicates(index);
            }
            if ui.button("Fill missing values").clicked() {
                state.fill_missing(index);
            }
        });
    }
    ui.add_space(6.0);

    // ---- Column selection ----
    ui.strong("Columns to keep");
    let view = &mut state.views[index];
    ui.horizontal_wrapped(|ui: &mut Ui| {
        for (name, keep) in &mut view.column_choices {
            ui.checkbox(keep, name.as_str());
        }
    });
    if ui.button("Apply selection").clicked() {
        state.apply_selection(index);
    }
    ui.add_space(6.0);

    // ---- Visualisation ----
    ui.strong("Visualisation");
    let view = &mut state.views[index];
    ui.checkbox(&mut view.show_chart, "Show chart");
    if view.show_chart {
        let limit = state.config.chart_columns;
        if let Some(Ok(series)) = state
            .batch
            .as_mut()
            .and_then(|b| b.get_mut(index))
            .map(|s| s.numeric_preview(limit))
        {
            plot::numeric_bar_chart(ui, index, &series);
        }
    }
    ui.add_space(6.0);

    // ---- Conversion ----
    ui.strong("Convert & download");
    let view = &mut state.views[index];
    ui.horizontal(|ui: &mut Ui| {
        for target in ConversionTarget::ALL {
            ui.radio_value(&mut view.target, target, target.label());
        }
    });
    if ui.button("Convert and save…").clicked() {
        if let Some(artifact) = state.convert(index) {
            save_dialog(state, index, &artifact);
        }
    }

    if let Some(notice) = &state.views[index].notice {
        match notice {
            Notice::Success(msg) => ui.label(RichText::new(msg).color(Color32::GREEN)),
            Notice::Error(msg) => ui.label(RichText::new(msg).color(Color32::RED)),
        };
    }
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_files_dialog(state: &mut AppState) {
    let files = rfd::FileDialog::new()
        .set_title("Upload CSV or Excel files")
        .add_filter("Supported files", &["csv", "xlsx"])
        .add_filter("CSV", &["csv"])
        .add_filter("Excel", &["xlsx"])
        .pick_files();

    if let Some(paths) = files {
        log::info!("Uploading {} files", paths.len());
        state.load_paths(&paths);
    }
}

fn save_dialog(state: &mut AppState, index: usize, artifact: &data_sweeper::ExportArtifact) {
    let target = rfd::FileDialog::new()
        .set_title("Save converted file")
        .set_file_name(&artifact.file_name)
        .save_file();

    let Some(path) = target else {
        return;
    };
    let notice = match save_artifact(artifact, &path) {
        Ok(()) => Notice::Success(format!("Saved {}", path.display())),
        Err(e) => {
            log::error!("Failed to save: {e:#}");
            Notice::Error(format!("Error: {e:#}"))
        }
    };
    if let Some(view) = state.views.get_mut(index) {
        view.notice = Some(notice);
    }
}
