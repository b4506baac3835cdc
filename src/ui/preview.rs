use eframe::egui::{RichText, Ui};
use egui_extras::{Column as GridColumn, TableBuilder};

use data_sweeper::{Table, Value};

/// Read-only grid of the first rows of a table.
pub fn table_grid(ui: &mut Ui, id: usize, table: &Table) {
    if table.width() == 0 {
        ui.label(format!("No columns selected ({} rows).", table.row_count()));
        return;
    }

    ui.push_id(("preview", id), |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .columns(GridColumn::auto().at_least(60.0), table.width())
            .header(20.0, |mut header| {
                for column in table.columns() {
                    header.col(|ui| {
                        ui.strong(column.name());
                    });
                }
            })
            .body(|mut body| {
                for row in 0..table.row_count() {
                    body.row(18.0, |mut cells| {
                        for value in table.row(row) {
                            cells.col(|ui| {
                                match value {
                                    Value::Missing => ui.label(RichText::new("(missing)").weak()),
                                    other => ui.label(other.to_string()),
                                };
                            });
                        }
                    });
                }
            });
    });
}
