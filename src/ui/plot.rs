use eframe::egui::{Stroke, Ui};
use egui_plot::{BoxElem, BoxPlot, BoxSpread, Plot, PlotPoints, Points};

use crate::data::filter::GroupBy;
use crate::data::stats::BoxSummary;
use crate::state::AppState;

const SALARY_AXIS: &str = "Salary (10k JPY)";

// ---------------------------------------------------------------------------
// Salary box plot (central panel)
// ---------------------------------------------------------------------------

/// Render one box per distribution, in engine order.
pub fn salary_plot(ui: &mut Ui, state: &AppState) {
    let analysis = match &state.analysis {
        Some(a) => a,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open a salary sheet to see box plots  (File → Open…)");
            });
            return;
        }
    };
    if analysis.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No data for the current selection");
        });
        return;
    }

    let group_by = analysis.config.group_by;
    ui.heading(chart_title(group_by));

    let labels: Vec<String> = analysis
        .distributions
        .iter()
        .map(|d| d.label.to_string())
        .collect();

    let mut boxes = Vec::with_capacity(analysis.distributions.len());
    let mut outlier_points = Vec::new();

    for (i, dist) in analysis.distributions.iter().enumerate() {
        let Some(summary) = BoxSummary::from_sorted(&dist.values) else {
            continue;
        };
        let x = i as f64;
        let color = state.color_map.color_for(&dist.label);

        boxes.push(
            BoxElem::new(
                x,
                BoxSpread::new(
                    summary.lower_whisker,
                    summary.q1,
                    summary.median,
                    summary.q3,
                    summary.upper_whisker,
                ),
            )
            .name(format!("{}: {}", group_by.label(), dist.label))
            .fill(color.gamma_multiply(0.4))
            .stroke(Stroke::new(1.5, color))
            .box_width(0.8),
        );

        if !summary.outliers.is_empty() {
            let points: Vec<[f64; 2]> = summary.outliers.iter().map(|&y| [x, y]).collect();
            outlier_points.push(
                Points::new(PlotPoints::from(points))
                    .color(color)
                    .radius(3.0),
            );
        }
    }

    Plot::new("salary_plot")
        .x_axis_label(group_by.label())
        .y_axis_label(SALARY_AXIS)
        .x_axis_formatter(move |mark, _range| axis_label(&labels, mark.value))
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            let hover = |elem: &BoxElem, _plot: &BoxPlot| {
                format!(
                    "{}\nmedian: {}\nQ1–Q3: {} – {}\n{SALARY_AXIS}",
                    elem.name, elem.spread.median, elem.spread.quartile1, elem.spread.quartile3,
                )
            };
            plot_ui.box_plot(BoxPlot::new(boxes).element_formatter(Box::new(hover)));
            for points in outlier_points {
                plot_ui.points(points);
            }
        });
}

pub fn chart_title(group_by: GroupBy) -> String {
    format!("Salary distribution by {group_by}")
}

/// Tick text for the categorical x-axis: the group label at integer
/// positions, nothing in between or outside.
fn axis_label(labels: &[String], value: f64) -> String {
    let rounded = value.round();
    if (value - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    labels.get(rounded as usize).cloned().unwrap_or_default()
}
