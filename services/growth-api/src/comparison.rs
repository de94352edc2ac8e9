//! Comparison orchestration: the six growth charts of one child.

use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use growth_common::{ChartKey, ChildRecord, GrowthResult};
use reference_data::ReferenceCatalog;
use renderer::{render_growth_chart, ChartRequest, ChartSummary};

/// One rendered (or failed) chart.
#[derive(Debug)]
pub struct ChartArtifact {
    pub key: ChartKey,
    pub path: PathBuf,
    pub outcome: GrowthResult<ChartSummary>,
}

impl ChartArtifact {
    pub fn is_rendered(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Render the six comparison charts of `record` into `out_dir`.
///
/// Charts are rendered one after another in [`ChartKey::all`] order, each
/// written as `{out_dir}/{slug}.png`. A chart whose reference table is not
/// in the catalog shows only the child's point. A failed chart is logged
/// and recorded in its artifact; the others are still rendered.
pub fn compare(catalog: &ReferenceCatalog, record: &ChildRecord, out_dir: &Path) -> Vec<ChartArtifact> {
    if let Err(e) = std::fs::create_dir_all(out_dir) {
        warn!(dir = %out_dir.display(), error = %e, "Cannot create chart directory");
    }

    let sex = record.sex();
    let age = f64::from(record.age_years);

    ChartKey::all()
        .into_iter()
        .map(|key| {
            let catalog_key = key.catalog_key(sex);
            let table = catalog.get(&catalog_key);
            if table.is_none() {
                warn!(key = %catalog_key, "No reference table; drawing child point only");
            }

            let path = out_dir.join(format!("{}.png", key.slug()));
            let request = ChartRequest {
                table,
                child_age: age,
                child_value: record.value_for(key.metric),
                metric_label: key.metric_label(),
                title: key.title(),
            };

            let outcome = render_growth_chart(&request, &path);
            match &outcome {
                Ok(summary) => info!(chart = %key, curves = summary.curves, "Chart rendered"),
                Err(e) => error!(chart = %key, error = %e, "Chart rendering failed"),
            }

            ChartArtifact { key, path, outcome }
        })
        .collect()
}
