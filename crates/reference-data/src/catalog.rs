//! Process-wide catalog of reference tables keyed by (metric, sex, kind).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;
use tracing::{error, info};

use growth_common::{BodyMetric, CatalogKey, Sex, TableKind};

use crate::table::ReferenceTable;

/// Where each catalog entry is read from.
#[derive(Debug, Clone)]
pub struct ReferenceManifest {
    base_dir: PathBuf,
    entries: Vec<(CatalogKey, String)>,
}

impl ReferenceManifest {
    pub fn new(base_dir: impl Into<PathBuf>, entries: Vec<(CatalogKey, String)>) -> Self {
        Self {
            base_dir: base_dir.into(),
            entries,
        }
    }

    /// The twelve WHO 2007 (5-19 years) files under `base_dir`.
    pub fn who_2007(base_dir: impl Into<PathBuf>) -> Self {
        use BodyMetric::*;
        use Sex::*;
        use TableKind::*;

        let files = [
            (Bmi, Boys, Percentile, "bmifa-boys-5-19years-per.csv"),
            (Bmi, Boys, ZScore, "bmifa-boys-5-19years-z.csv"),
            (Bmi, Girls, Percentile, "bmifa-girls-5-19years-per.csv"),
            (Bmi, Girls, ZScore, "bmifa-girls-5-19years-z.csv"),
            (Height, Boys, Percentile, "hfa-boys-5-19years-per.csv"),
            (Height, Boys, ZScore, "sft-hfa-boys-perc-5-19years.csv"),
            (Height, Girls, Percentile, "hfa-girls-5-19years-per.csv"),
            (Height, Girls, ZScore, "sft-hfa-girls-perc-5-19years.csv"),
            (Weight, Boys, Percentile, "wfa-boys-5-10years-per.csv"),
            (Weight, Boys, ZScore, "wfa-boys-5-10years-z.csv"),
            (Weight, Girls, Percentile, "wfa-girls-5-10years-per.csv"),
            (Weight, Girls, ZScore, "wfa-girls-5-10years-z.csv"),
        ];

        let entries = files
            .into_iter()
            .map(|(metric, sex, kind, file)| (CatalogKey::new(metric, sex, kind), file.to_string()))
            .collect();

        Self::new(base_dir, entries)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// `(key, resolved path)` for every entry.
    pub fn entries(&self) -> impl Iterator<Item = (CatalogKey, PathBuf)> + '_ {
        self.entries
            .iter()
            .map(|(key, file)| (*key, self.base_dir.join(file)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Outcome of a catalog load: which entries made it in and which did not.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    pub loaded: Vec<CatalogKey>,
    pub failed: Vec<FailedEntry>,
    pub duration_ms: u64,
}

/// A manifest entry that could not be loaded.
#[derive(Debug, Clone, Serialize)]
pub struct FailedEntry {
    pub key: CatalogKey,
    pub path: String,
    pub error: String,
}

/// Read-only reference tables, built once at startup.
#[derive(Debug, Clone, Default)]
pub struct ReferenceCatalog {
    tables: BTreeMap<CatalogKey, ReferenceTable>,
}

impl ReferenceCatalog {
    /// Load every manifest entry. A file that is missing or malformed is
    /// logged and left out; the rest still load.
    pub fn load(manifest: &ReferenceManifest) -> (Self, LoadReport) {
        let start = Instant::now();
        let mut tables = BTreeMap::new();
        let mut report = LoadReport::default();

        for (key, path) in manifest.entries() {
            match ReferenceTable::from_path(&path) {
                Ok(table) => {
                    info!(key = %key, path = %path.display(), rows = table.len(), "Loaded reference table");
                    tables.insert(key, table);
                    report.loaded.push(key);
                }
                Err(e) => {
                    error!(key = %key, path = %path.display(), error = %e, "Failed to load reference table");
                    report.failed.push(FailedEntry {
                        key,
                        path: path.display().to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            loaded = report.loaded.len(),
            failed = report.failed.len(),
            duration_ms = report.duration_ms,
            "Reference catalog ready"
        );

        (Self { tables }, report)
    }

    /// Build a catalog from tables already in memory.
    pub fn from_tables(tables: impl IntoIterator<Item = (CatalogKey, ReferenceTable)>) -> Self {
        Self {
            tables: tables.into_iter().collect(),
        }
    }

    pub fn get(&self, key: &CatalogKey) -> Option<&ReferenceTable> {
        self.tables.get(key)
    }

    pub fn contains(&self, key: &CatalogKey) -> bool {
        self.tables.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &CatalogKey> {
        self.tables.keys()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Per-entry row counts, for the catalog status endpoint.
    pub fn summary(&self) -> Vec<CatalogEntrySummary> {
        self.tables
            .iter()
            .map(|(key, table)| CatalogEntrySummary {
                key: key.to_string(),
                rows: table.len(),
                curves: table.curve_columns().len(),
            })
            .collect()
    }
}

/// Row and curve counts of one loaded table.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntrySummary {
    pub key: String,
    pub rows: usize,
    pub curves: usize,
}
