use std::path::Path;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::filter::{FilterMode, GroupBy};
use crate::data::loader::{SUPPORTED_EXTENSIONS, WORKBOOK_EXTENSIONS};
use crate::data::session::Session;
use crate::data::table::{highlight_note, highlight_table, TableView};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – analysis controls
// ---------------------------------------------------------------------------

/// Render the grouping / filter controls.
pub fn control_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Analysis");
    ui.separator();

    ui.strong("Group by");
    let current = state.config.group_by;
    egui::ComboBox::from_id_salt("group_by")
        .selected_text(current.label())
        .show_ui(ui, |ui: &mut Ui| {
            for group_by in GroupBy::ALL {
                if ui
                    .selectable_label(current == group_by, group_by.label())
                    .clicked()
                {
                    state.set_group_by(group_by);
                }
            }
        });

    ui.add_space(4.0);
    ui.strong("Filter");
    let current = state.config.filter;
    egui::ComboBox::from_id_salt("filter")
        .selected_text(current.label())
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for filter in FilterMode::ALL {
                if ui.selectable_label(current == filter, filter.label()).clicked() {
                    state.set_filter(filter);
                }
            }
        });

    ui.separator();
    ui.label(state.config.describe());

    if let Some(session) = &state.session {
        ui.separator();
        egui::CollapsingHeader::new(RichText::new("Detected columns").strong())
            .default_open(false)
            .show(ui, |ui: &mut Ui| {
                let b = session.binding();
                ui.label(format!("Team: {}", b.team));
                ui.label(format!("Position: {}", b.position));
                ui.label(format!("Salary: {}", b.salary));
                ui.label(format!("Player name: {}", b.name.as_deref().unwrap_or("—")));
            });
    }
}

// ---------------------------------------------------------------------------
// Right side panel – outliers / top earners
// ---------------------------------------------------------------------------

pub fn highlight_panel(ui: &mut Ui, state: &AppState) {
    ui.heading("Highlighted players");
    ui.separator();

    let group_by = state.config.group_by;
    let highlights = state.analysis.as_ref().map(|a| &a.highlights);
    ui.label(highlight_note(highlights, group_by));

    let Some(table) = highlights.and_then(|h| highlight_table(h, group_by)) else {
        return;
    };
    if table.is_empty() {
        ui.label(RichText::new("No matching players.").italics());
        return;
    }
    ui.add_space(4.0);
    table_view(ui, "highlight_table", &table);
}

// ---------------------------------------------------------------------------
// Bottom panel – loaded rows
// ---------------------------------------------------------------------------

pub fn preview_panel(ui: &mut Ui, state: &AppState) {
    ui.strong("Loaded data");
    if state.preview.headers.is_empty() {
        ui.label("No data loaded.");
        return;
    }
    table_view(ui, "preview_table", &state.preview);
}

/// Render a [`TableView`] as a striped, scrollable grid.
fn table_view(ui: &mut Ui, id: &str, table: &TableView) {
    ui.push_id(id, |ui: &mut Ui| {
        ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .columns(Column::auto().at_least(60.0), table.headers.len())
                .header(20.0, |mut header| {
                    for h in &table.headers {
                        header.col(|ui: &mut Ui| {
                            ui.strong(h);
                        });
                    }
                })
                .body(|body| {
                    body.rows(18.0, table.rows.len(), |mut row| {
                        let cells = &table.rows[row.index()];
                        for cell in cells {
                            row.col(|ui: &mut Ui| {
                                ui.label(cell);
                            });
                        }
                    });
                });
        });
    });
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
            let can_export = state.analysis.is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Export analysis…"))
                .clicked()
            {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(session), Some(source)) = (&state.session, &state.source_name) {
            ui.label(format!("{} rows loaded from {source}", session.dataset().len()));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open salary sheet")
        .add_filter("Supported files", &SUPPORTED_EXTENSIONS)
        .add_filter("Excel / ODS", &WORKBOOK_EXTENSIONS)
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        let result = Session::load(&path, &state.keywords);
        state.apply_load(result, &display_name(&path));
    }
}

fn export_dialog(state: &mut AppState) {
    let Some(analysis) = &state.analysis else {
        return;
    };
    let file = rfd::FileDialog::new()
        .set_title("Export analysis")
        .add_filter("JSON", &["json"])
        .set_file_name("salary_analysis.json")
        .save_file();

    if let Some(path) = file {
        match crate::data::export::write_json(analysis, &path) {
            Ok(()) => {
                log::info!("Exported analysis to {}", path.display());
                state.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to export analysis: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
