//! Growth chart rendering.
//!
//! Draws WHO reference curves against age together with one child's
//! measurement:
//! - Chart planning and PNG output ([`chart`])
//! - A drawing backend that tolerates missing fonts ([`backend`])
//! - Optional font registration ([`font`])

pub mod backend;
pub mod chart;
pub mod font;

pub use backend::{approximate_text_size, FontSafeBackend};
pub use chart::{
    draw_chart, render_growth_chart, ChartPlan, ChartRequest, ChartSummary, Curve,
    AGE_AXIS_LABEL, CHART_SIZE, CHILD_LABEL,
};
pub use font::{ensure_chart_font, register_chart_font, CHART_FONT_FAMILY};
