//! Growth chart rendering: reference curves by age plus the child's point.
//!
//! Rendering is split in two:
//! - [`ChartPlan::build`] decides what is drawn (curves, point, axis ranges)
//!   and is pure, so it can be inspected directly.
//! - [`draw_chart`] puts a plan on a PNG with plotters.

use std::ops::Range;
use std::panic;
use std::path::{Path, PathBuf};

use plotters::prelude::*;
use serde::Serialize;
use tracing::{debug, instrument};

use growth_common::{GrowthError, GrowthResult};
use reference_data::ReferenceTable;

use crate::backend::FontSafeBackend;
use crate::font::{ensure_chart_font, CHART_FONT_FAMILY};

/// Output size in pixels (portrait, 6x8 at 100 dpi).
pub const CHART_SIZE: (u32, u32) = (600, 800);

/// Legend label of the child's point.
pub const CHILD_LABEL: &str = "Child's Data";

/// X axis label.
pub const AGE_AXIS_LABEL: &str = "Age (years)";

/// Fraction of the data span added on each side of an axis.
const AXIS_PADDING: f64 = 0.05;

/// One color per known curve column, in drawing order.
const CURVE_COLORS: [RGBColor; 17] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
];

const CHILD_COLOR: RGBColor = RGBColor(220, 20, 20);

/// Inputs of one growth chart.
#[derive(Debug, Clone, Copy)]
pub struct ChartRequest<'a> {
    /// Reference table; `None` draws only the child's point.
    pub table: Option<&'a ReferenceTable>,
    pub child_age: f64,
    pub child_value: f64,
    pub metric_label: &'a str,
    pub title: &'a str,
}

/// One reference curve: a canonical column against age.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Curve {
    pub column: &'static str,
    pub points: Vec<(f64, f64)>,
}

/// Everything a chart will show.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPlan {
    pub title: String,
    pub metric_label: String,
    pub curves: Vec<Curve>,
    pub child_point: (f64, f64),
    pub x_range: Range<f64>,
    pub y_range: Range<f64>,
}

impl ChartPlan {
    /// Plan a chart: one curve per known column present in the table.
    pub fn build(request: &ChartRequest<'_>) -> GrowthResult<Self> {
        let point = (request.child_age, request.child_value);
        if !point.0.is_finite() || !point.1.is_finite() {
            return Err(GrowthError::Render(format!(
                "child measurement ({}, {}) is not a finite point",
                point.0, point.1
            )));
        }

        let curves: Vec<Curve> = match request.table {
            Some(table) => table
                .curve_columns()
                .into_iter()
                .map(|column| Curve {
                    column,
                    points: table.series(column),
                })
                .collect(),
            None => Vec::new(),
        };

        let x_range = padded_range(
            curves
                .iter()
                .flat_map(|c| c.points.iter().map(|p| p.0))
                .chain(std::iter::once(point.0)),
        );
        let y_range = padded_range(
            curves
                .iter()
                .flat_map(|c| c.points.iter().map(|p| p.1))
                .chain(std::iter::once(point.1)),
        );

        Ok(Self {
            title: request.title.to_string(),
            metric_label: request.metric_label.to_string(),
            curves,
            child_point: point,
            x_range,
            y_range,
        })
    }

    /// Legend entries in order: every curve, then the child's point.
    pub fn legend_labels(&self) -> Vec<&str> {
        self.curves
            .iter()
            .map(|c| c.column)
            .chain(std::iter::once(CHILD_LABEL))
            .collect()
    }
}

/// What was written for a chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSummary {
    pub path: PathBuf,
    pub curves: usize,
    pub points: usize,
}

/// Plan and draw a chart to `output`, overwriting any existing file.
///
/// A panic inside plotters is returned as a `Render` error for this chart.
#[instrument(skip(request), fields(title = %request.title, path = %output.display()))]
pub fn render_growth_chart(request: &ChartRequest<'_>, output: &Path) -> GrowthResult<ChartSummary> {
    ensure_chart_font();

    let summary = catch_render_panic(output, || {
        let plan = ChartPlan::build(request)?;
        draw_chart(&plan, output)?;
        Ok(ChartSummary {
            path: output.to_path_buf(),
            curves: plan.curves.len(),
            points: 1,
        })
    })?;

    debug!(curves = summary.curves, "Rendered growth chart");
    Ok(summary)
}

fn catch_render_panic<T>(
    output: &Path,
    render: impl FnOnce() -> GrowthResult<T>,
) -> GrowthResult<T> {
    panic::catch_unwind(panic::AssertUnwindSafe(render)).unwrap_or_else(|_| {
        Err(GrowthError::Render(format!(
            "{}: plotting backend panicked",
            output.display()
        )))
    })
}

/// Draw a planned chart as a PNG.
///
/// The drawing area is presented (flushed to disk) before returning, so no
/// drawing state outlives the call.
pub fn draw_chart(plan: &ChartPlan, output: &Path) -> GrowthResult<()> {
    draw(plan, output).map_err(|e| GrowthError::Render(format!("{}: {}", output.display(), e)))
}

fn draw(plan: &ChartPlan, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let backend = BitMapBackend::new(output, CHART_SIZE);
    let root = FontSafeBackend::new(backend).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&plan.title, (CHART_FONT_FAMILY, 22))
        .margin(20)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(plan.x_range.clone(), plan.y_range.clone())?;

    chart
        .configure_mesh()
        .x_desc(AGE_AXIS_LABEL)
        .y_desc(plan.metric_label.as_str())
        .label_style((CHART_FONT_FAMILY, 14))
        .light_line_style(RGBColor(235, 235, 235))
        .draw()?;

    for (i, curve) in plan.curves.iter().enumerate() {
        let color = CURVE_COLORS[i % CURVE_COLORS.len()];
        chart
            .draw_series(LineSeries::new(
                curve.points.iter().copied(),
                color.stroke_width(2),
            ))?
            .label(curve.column)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    chart
        .draw_series(std::iter::once(Circle::new(
            plan.child_point,
            6,
            CHILD_COLOR.filled(),
        )))?
        .label(CHILD_LABEL)
        .legend(|(x, y)| Circle::new((x + 10, y), 5, CHILD_COLOR.filled()));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK.mix(0.4))
        .label_font((CHART_FONT_FAMILY, 12))
        .position(SeriesLabelPosition::UpperLeft)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Min..max of `values` padded on both sides; a zero-width span is widened by 1.
fn padded_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));

    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }

    let span = max - min;
    if span <= f64::EPSILON * max.abs().max(1.0) {
        return (min - 1.0)..(max + 1.0);
    }
    let pad = span * AXIS_PADDING;
    (min - pad)..(max + pad)
}
