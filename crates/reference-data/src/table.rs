//! In-memory reference tables with canonical column names.

use std::cmp::Ordering;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use growth_common::{GrowthError, GrowthResult};

use crate::age::parse_age_cell;
use crate::columns::{self, AGE_YEARS, CURVE_COLUMNS, RAW_COMPOSITE_AGE};

/// A reference table: canonical column names plus rows of optional values.
///
/// Rows are sorted by ascending `Age (years)`. Rows whose age could not be
/// parsed are kept after all aged rows but never plotted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReferenceTable {
    columns: Vec<String>,
    rows: Vec<Vec<Option<f64>>>,
}

impl ReferenceTable {
    /// Build a table from canonical columns and rows; rows are age-sorted.
    ///
    /// Short rows are padded with empty cells, long rows truncated.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<f64>>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, None);
                row
            })
            .collect();

        let mut table = Self { columns, rows };
        table.sort_by_age();
        table
    }

    /// A table with no columns, drawn as a chart holding only the child's point.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Read a CSV source with a header row, normalizing headers.
    pub fn from_csv<R: Read>(reader: R) -> GrowthResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let raw_headers: Vec<String> = csv_reader
            .headers()
            .map_err(|e| GrowthError::Parse(format!("unreadable header row: {}", e)))?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').to_string())
            .collect();

        if raw_headers.iter().all(|h| h.trim().is_empty()) {
            return Err(GrowthError::Parse("missing header row".to_string()));
        }

        let columns = columns::normalize_headers(&raw_headers);
        let composite_age: Vec<bool> = raw_headers
            .iter()
            .map(|h| h.trim() == RAW_COMPOSITE_AGE)
            .collect();

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record.map_err(|e| GrowthError::Parse(format!("bad record: {}", e)))?;
            let row = columns
                .iter()
                .enumerate()
                .map(|(i, name)| {
                    let cell = record.get(i).unwrap_or("");
                    if name == AGE_YEARS {
                        parse_age_cell(cell, composite_age[i])
                    } else {
                        parse_number(cell)
                    }
                })
                .collect();
            rows.push(row);
        }

        debug!(columns = ?columns, rows = rows.len(), "Parsed reference table");
        Ok(Self::new(columns, rows))
    }

    /// Open and read a CSV file. Any failure is a [`GrowthError::SourceLoad`].
    pub fn from_path(path: &Path) -> GrowthResult<Self> {
        let source_load = |message: String| GrowthError::SourceLoad {
            path: path.display().to_string(),
            message,
        };

        let file = File::open(path).map_err(|e| source_load(e.to_string()))?;
        Self::from_csv(file).map_err(|e| source_load(e.to_string()))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Option<f64>>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Value at (row, column name), if present and parsed.
    pub fn value(&self, row: usize, column: &str) -> Option<f64> {
        let col = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r[col])
    }

    /// Known curve columns present in this table, in drawing order.
    pub fn curve_columns(&self) -> Vec<&'static str> {
        CURVE_COLUMNS
            .iter()
            .copied()
            .filter(|name| self.has_column(name))
            .collect()
    }

    /// `(age, value)` pairs of a column, skipping rows where either is missing.
    pub fn series(&self, column: &str) -> Vec<(f64, f64)> {
        let (Some(age_idx), Some(col_idx)) = (self.column_index(AGE_YEARS), self.column_index(column))
        else {
            return Vec::new();
        };

        self.rows
            .iter()
            .filter_map(|row| Some((row[age_idx]?, row[col_idx]?)))
            .collect()
    }

    fn sort_by_age(&mut self) {
        let Some(age_idx) = self.column_index(AGE_YEARS) else {
            return;
        };
        // Stable: rows sharing an age keep source order; unaged rows go last.
        self.rows.sort_by(|a, b| match (a[age_idx], b[age_idx]) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
    }
}

fn parse_number(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
