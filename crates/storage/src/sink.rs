//! Upload seam between the request pipeline and storage.

use std::path::Path;

use async_trait::async_trait;

use growth_common::GrowthResult;

/// Destination for rendered chart files.
#[async_trait]
pub trait ChartSink: Send + Sync {
    /// Upload the file at `local` under the object name `dest` and return
    /// its public URL.
    ///
    /// A missing local file is a [`GrowthError::Upload`](growth_common::GrowthError::Upload).
    async fn upload(&self, local: &Path, dest: &str) -> GrowthResult<String>;
}

/// Object name of an uploaded chart: `{name}_{slug}.png`, spaces in the
/// child's name replaced by underscores.
pub fn chart_object_name(child_name: &str, slug: &str) -> String {
    format!("{}_{}.png", child_name.replace(' ', "_"), slug)
}
