use eframe::egui::Ui;
use egui_plot::{Bar, BarChart, Legend, Plot};

use crate::color::series_palette;
use data_sweeper::NumericSeries;

// ---------------------------------------------------------------------------
// Numeric bar chart
// ---------------------------------------------------------------------------

/// Grouped bar chart: one bar per row for each numeric series, side by side.
pub fn numeric_bar_chart(ui: &mut Ui, id: usize, series: &[NumericSeries]) {
    if series.is_empty() {
        ui.label("No numeric columns to chart.");
        return;
    }

    let colours = series_palette(series.len());
    let bar_width = 0.8 / series.len() as f64;

    Plot::new(("numeric_chart", id))
        .legend(Legend::default())
        .x_axis_label("Row")
        .height(240.0)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (i, (s, colour)) in series.iter().zip(colours).enumerate() {
                let offset = (i as f64 - (series.len() as f64 - 1.0) / 2.0) * bar_width;
                let bars: Vec<Bar> = s
                    .values
                    .iter()
                    .enumerate()
                    // Gaps are simply not drawn.
                    .filter_map(|(row, v)| v.map(|v| Bar::new(row as f64 + offset, v).width(bar_width)))
                    .collect();

                plot_ui.bar_chart(BarChart::new(bars).name(&s.name).color(colour));
            }
        });
}
