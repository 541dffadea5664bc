//! Diagnostic plots for a fitted gas model
//!
//! Four panels on one 2×2 canvas: predicted vs actual TotalGas, TotalGas
//! distribution per operation, the largest coefficients, and TotalGas
//! scaling with Rows. The output backend follows the file extension:
//! `.svg` renders vector output, anything else goes through the bitmap
//! encoder.

use crate::dataset::{GasTable, Operation};
use crate::features::Feature;
use crate::regression::{FitReport, LinearModel};
use crate::report::format_gas;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::ops::Range;
use std::path::Path;
use thiserror::Error;

/// Number of coefficients shown in the bar panel
pub const TOP_COEFFICIENTS: usize = 10;

const CAPTION_FONT: (&str, u32) = ("sans-serif", 22);

/// Font used for every label, registered under the default family name
static SANS_SERIF: &[u8] = include_bytes!("../assets/fonts/DejaVuSans.ttf");

/// Errors for diagnostic rendering
#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Nothing to plot: the table has no records")]
    NoData,

    #[error("Embedded chart font could not be loaded")]
    Font,

    #[error("Failed to draw {panel}: {message}")]
    Drawing {
        panel: &'static str,
        message: String,
    },
}

fn drawing_error<E: std::fmt::Display>(panel: &'static str) -> impl Fn(E) -> PlotError {
    move |e| PlotError::Drawing {
        panel,
        message: e.to_string(),
    }
}

/// Five-number summary of a box plot, Tukey whiskers
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Smallest value within q1 - 1.5 IQR
    pub lower_whisker: f64,
    /// Largest value within q3 + 1.5 IQR
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

/// Quartiles by linear interpolation, `None` for an empty slice
pub fn box_stats(values: &[f64]) -> Option<BoxStats> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let q1 = quantile(&sorted, 0.25);
    let median = quantile(&sorted, 0.5);
    let q3 = quantile(&sorted, 0.75);

    let iqr = q3 - q1;
    let (low_fence, high_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

    let inside = values
        .iter()
        .copied()
        .filter(|v| (low_fence..=high_fence).contains(v));
    let lower_whisker = inside.clone().fold(f64::INFINITY, f64::min).min(q1);
    let upper_whisker = inside.fold(f64::NEG_INFINITY, f64::max).max(q3);

    let outliers = values
        .iter()
        .copied()
        .filter(|v| !(low_fence..=high_fence).contains(v))
        .collect();

    Some(BoxStats {
        q1,
        median,
        q3,
        lower_whisker,
        upper_whisker,
        outliers,
    })
}

/// Linear interpolation between closest ranks (R-7) over sorted, non-empty data
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let h = (sorted.len() - 1) as f64 * q;
    let lower = h.floor() as usize;
    let upper = h.ceil() as usize;
    sorted[lower] + (h - lower as f64) * (sorted[upper] - sorted[lower])
}

/// The `n` largest signed coefficients, largest first
pub fn top_coefficients(model: &LinearModel, n: usize) -> Vec<(Feature, f64)> {
    model.coefficient_table().into_iter().take(n).collect()
}

/// Register the embedded font for the families the charts use
pub fn register_fonts() -> Result<(), PlotError> {
    plotters::style::register_font("sans-serif", FontStyle::Normal, SANS_SERIF)
        .map_err(|_| PlotError::Font)
}

/// Render the four diagnostic panels to `path`, overwriting it
pub fn render_diagnostics(
    table: &GasTable,
    fit: &FitReport,
    path: &Path,
    size: (u32, u32),
) -> Result<(), PlotError> {
    if table.is_empty() {
        return Err(PlotError::NoData);
    }
    register_fonts()?;

    let is_svg = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"));

    if is_svg {
        let root = SVGBackend::new(path, size).into_drawing_area();
        draw_panels(&root, table, fit)?;
        root.present().map_err(drawing_error("canvas"))?;
    } else {
        let root = BitMapBackend::new(path, size).into_drawing_area();
        draw_panels(&root, table, fit)?;
        root.present().map_err(drawing_error("canvas"))?;
    }

    tracing::info!("Wrote diagnostics to {}", path.display());
    Ok(())
}

fn draw_panels<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    table: &GasTable,
    fit: &FitReport,
) -> Result<(), PlotError> {
    root.fill(&WHITE).map_err(drawing_error("canvas"))?;
    let panels = root.split_evenly((2, 2));

    draw_predicted_vs_actual(&panels[0], fit)?;
    draw_operation_boxes(&panels[1], table)?;
    draw_coefficients(&panels[2], &fit.model)?;
    draw_rows_scaling(&panels[3], table)?;
    Ok(())
}

fn draw_predicted_vs_actual<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    fit: &FitReport,
) -> Result<(), PlotError> {
    const PANEL: &str = "predicted vs actual";

    let (lo, hi) = bounds(fit.actual.iter().chain(&fit.predictions).copied());
    let range = padded(lo, hi);

    let mut chart = ChartBuilder::on(area)
        .caption("Actual vs Predicted Total Gas", CAPTION_FONT)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(80)
        .build_cartesian_2d(range.clone(), range)
        .map_err(drawing_error(PANEL))?;

    chart
        .configure_mesh()
        .x_desc("Actual Gas")
        .y_desc("Predicted Gas")
        .x_label_formatter(&|x| format_gas(*x))
        .y_label_formatter(&|y| format_gas(*y))
        .draw()
        .map_err(drawing_error(PANEL))?;

    chart
        .draw_series(
            fit.actual
                .iter()
                .zip(&fit.predictions)
                .map(|(&a, &p)| Circle::new((a, p), 3, BLUE.mix(0.6).filled())),
        )
        .map_err(drawing_error(PANEL))?;

    let (actual_lo, actual_hi) = bounds(fit.actual.iter().copied());
    chart
        .draw_series(LineSeries::new(
            vec![(actual_lo, actual_lo), (actual_hi, actual_hi)],
            RED.stroke_width(2),
        ))
        .map_err(drawing_error(PANEL))?;

    Ok(())
}

fn draw_operation_boxes<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    table: &GasTable,
) -> Result<(), PlotError> {
    const PANEL: &str = "gas by operation";

    let groups: Vec<(Operation, BoxStats)> = table
        .operations()
        .into_iter()
        .filter_map(|op| {
            let values: Vec<f64> = table
                .records()
                .iter()
                .filter(|r| r.operation == op)
                .map(|r| r.total_gas)
                .collect();
            box_stats(&values).map(|stats| (op, stats))
        })
        .collect();
    let names: Vec<&str> = groups.iter().map(|(op, _)| op.label()).collect();

    let (lo, hi) = bounds(table.records().iter().map(|r| r.total_gas));
    let mut chart = ChartBuilder::on(area)
        .caption("Gas Distribution by Operation", CAPTION_FONT)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(80)
        .build_cartesian_2d(-0.5..(groups.len() as f64 - 0.5), padded(lo, hi))
        .map_err(drawing_error(PANEL))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Operation")
        .y_desc("Total Gas")
        .x_labels(names.len())
        .x_label_formatter(&|x| category_label(&names, *x))
        .y_label_formatter(&|y| format_gas(*y))
        .draw()
        .map_err(drawing_error(PANEL))?;

    for (idx, (_, stats)) in groups.iter().enumerate() {
        let x = idx as f64;
        let (left, right) = (x - 0.3, x + 0.3);

        chart
            .draw_series([
                Rectangle::new([(left, stats.q1), (right, stats.q3)], BLUE.mix(0.25).filled()),
                Rectangle::new([(left, stats.q1), (right, stats.q3)], BLUE.stroke_width(1)),
            ])
            .map_err(drawing_error(PANEL))?;

        chart
            .draw_series([
                PathElement::new(vec![(left, stats.median), (right, stats.median)], RED.stroke_width(2)),
                PathElement::new(vec![(x, stats.q3), (x, stats.upper_whisker)], BLACK),
                PathElement::new(vec![(x, stats.q1), (x, stats.lower_whisker)], BLACK),
                PathElement::new(
                    vec![(x - 0.15, stats.upper_whisker), (x + 0.15, stats.upper_whisker)],
                    BLACK,
                ),
                PathElement::new(
                    vec![(x - 0.15, stats.lower_whisker), (x + 0.15, stats.lower_whisker)],
                    BLACK,
                ),
            ])
            .map_err(drawing_error(PANEL))?;

        chart
            .draw_series(
                stats
                    .outliers
                    .iter()
                    .map(|&v| Circle::new((x, v), 3, BLACK.mix(0.8))),
            )
            .map_err(drawing_error(PANEL))?;
    }

    Ok(())
}

fn draw_coefficients<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    model: &LinearModel,
) -> Result<(), PlotError> {
    const PANEL: &str = "coefficients";

    let top = top_coefficients(model, TOP_COEFFICIENTS);
    let names: Vec<&str> = top.iter().map(|(f, _)| f.name()).collect();
    let (lo, hi) = bounds(top.iter().map(|(_, c)| *c).chain([0.0]));

    let mut chart = ChartBuilder::on(area)
        .caption(format!("Top {} Feature Coefficients", TOP_COEFFICIENTS), CAPTION_FONT)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(130)
        .build_cartesian_2d(padded(lo, hi), -0.5..(top.len() as f64 - 0.5))
        .map_err(drawing_error(PANEL))?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .x_desc("Coefficient (Gas Impact)")
        .y_labels(names.len())
        .y_label_formatter(&|y| category_label(&names, *y))
        .x_label_formatter(&|x| format_gas(*x))
        .draw()
        .map_err(drawing_error(PANEL))?;

    chart
        .draw_series(top.iter().enumerate().map(|(idx, &(_, coefficient))| {
            let y = idx as f64;
            Rectangle::new(
                [(coefficient.min(0.0), y - 0.4), (coefficient.max(0.0), y + 0.4)],
                BLUE.mix(0.7).filled(),
            )
        }))
        .map_err(drawing_error(PANEL))?;

    Ok(())
}

fn draw_rows_scaling<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    table: &GasTable,
) -> Result<(), PlotError> {
    const PANEL: &str = "gas scaling with rows";

    let records = table.records();
    let (x_lo, x_hi) = bounds(records.iter().map(|r| r.rows as f64));
    let (y_lo, y_hi) = bounds(records.iter().map(|r| r.total_gas));

    let mut chart = ChartBuilder::on(area)
        .caption("Gas Scaling with Rows (by Operation)", CAPTION_FONT)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(80)
        .build_cartesian_2d(padded(x_lo, x_hi), padded(y_lo, y_hi))
        .map_err(drawing_error(PANEL))?;

    chart
        .configure_mesh()
        .x_desc("Number of Rows")
        .y_desc("Total Gas")
        .y_label_formatter(&|y| format_gas(*y))
        .draw()
        .map_err(drawing_error(PANEL))?;

    for (idx, op) in table.operations().into_iter().enumerate() {
        let color = Palette99::pick(idx).mix(0.7);
        chart
            .draw_series(
                records
                    .iter()
                    .filter(|r| r.operation == op)
                    .map(|r| Circle::new((r.rows as f64, r.total_gas), 4, color.filled())),
            )
            .map_err(drawing_error(PANEL))?
            .label(op.label())
            .legend(move |(x, y)| Circle::new((x, y), 4, color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(drawing_error(PANEL))?;

    Ok(())
}

/// Min and max of finite values; (0, 0) when there are none
fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if lo > hi {
        (0.0, 0.0)
    } else {
        (lo, hi)
    }
}

/// Axis range with 5% headroom; never empty
fn padded(lo: f64, hi: f64) -> Range<f64> {
    let span = hi - lo;
    let pad = if span > 0.0 {
        span * 0.05
    } else {
        (lo.abs() * 0.05).max(1.0)
    };
    (lo - pad)..(hi + pad)
}

/// Label for an integer tick on a categorical axis, empty between ticks
fn category_label(names: &[&str], position: f64) -> String {
    let idx = position.round();
    if (position - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    names
        .get(idx as usize)
        .map(|name| name.to_string())
        .unwrap_or_default()
}
