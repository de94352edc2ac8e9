//! Chart font registration.
//!
//! Plotters lays out legends with the registered font directly, so a chart
//! cannot be drawn without one. DejaVu Sans ships with the crate and is
//! registered before the first chart; `CHART_FONT_PATH` can replace it.

use std::path::Path;
use std::sync::Once;

use plotters::style::{register_font, FontStyle};
use tracing::{info, warn};

use growth_common::{GrowthError, GrowthResult};

/// Family name every chart text style uses.
pub const CHART_FONT_FAMILY: &str = "sans-serif";

/// DejaVu Sans (Bitstream Vera license, see `assets/DejaVuSans-LICENSE.txt`).
static BUNDLED_FONT: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

static BUNDLED_FONT_INIT: Once = Once::new();

/// Register the bundled font as the chart font, once per process.
pub fn ensure_chart_font() {
    BUNDLED_FONT_INIT.call_once(|| {
        if register_font(CHART_FONT_FAMILY, FontStyle::Normal, BUNDLED_FONT).is_err() {
            warn!("Bundled chart font could not be parsed");
        }
    });
}

/// Register a TTF/OTF file as the chart font, replacing the bundled one.
///
/// The font bytes live for the rest of the process.
pub fn register_chart_font(path: &Path) -> GrowthResult<()> {
    ensure_chart_font();

    let bytes = std::fs::read(path)?;
    let size = bytes.len();
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());

    for style in [FontStyle::Normal, FontStyle::Bold] {
        register_font(CHART_FONT_FAMILY, style, bytes).map_err(|_| {
            GrowthError::Config(format!("invalid chart font {}", path.display()))
        })?;
    }

    info!(path = %path.display(), bytes = size, "Registered chart font");
    Ok(())
}
