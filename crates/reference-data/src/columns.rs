//! Canonical column names and the raw-header rename table.
//!
//! The WHO downloads name their columns inconsistently across files
//! (`3rd` in percentile files, `-3 SD` in z-score files, and a doubled-letter
//! variant such as `3rdd` where a file carries both). Every header is mapped
//! to a canonical name once at load; nothing downstream sees raw names.

/// Age as a continuous number of years.
pub const AGE_YEARS: &str = "Age (years)";

/// Age in whole months, when the source carries it.
pub const AGE_MONTHS: &str = "Age (months)";

/// Raw header holding the composite `years:months` age.
pub const RAW_COMPOSITE_AGE: &str = "Year: Month";

/// Raw header → canonical name. Keys are raw names only, so applying the
/// mapping to an already-canonical header is a no-op.
pub const COLUMN_MAPPING: &[(&str, &str)] = &[
    (RAW_COMPOSITE_AGE, AGE_YEARS),
    ("Month", AGE_MONTHS),
    ("3rd", "3rd Percentile"),
    ("15th", "15th Percentile"),
    ("50th", "50th Percentile"),
    ("85th", "85th Percentile"),
    ("97th", "97th Percentile"),
    ("-3 SD", "-3SD Z-Scores"),
    ("-2 SD", "-2SD Z-Scores"),
    ("-1 SD", "-1SD Z-Scores"),
    ("Median", "Median Z-Scores"),
    ("1 SD", "1SD Z-Scores"),
    ("2 SD", "2SD Z-Scores"),
    ("3 SD", "3SD Z-Scores"),
    ("3rdd", "3rd Z-Scores"),
    ("15thh", "15th Z-Scores"),
    ("Mediann", "Median Z Scores"),
    ("85thh", "85th Z-Scores"),
    ("97thh", "97th Z-Scores"),
];

/// Every column drawn as a curve, in drawing (and legend) order.
pub const CURVE_COLUMNS: [&str; 17] = [
    "3rd Percentile",
    "15th Percentile",
    "50th Percentile",
    "85th Percentile",
    "97th Percentile",
    "-3SD Z-Scores",
    "-2SD Z-Scores",
    "-1SD Z-Scores",
    "Median Z-Scores",
    "1SD Z-Scores",
    "2SD Z-Scores",
    "3SD Z-Scores",
    "3rd Z-Scores",
    "15th Z-Scores",
    "Median Z Scores",
    "85th Z-Scores",
    "97th Z-Scores",
];

/// Canonical name for a raw header. Unknown headers keep their (trimmed) name.
pub fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim();
    COLUMN_MAPPING
        .iter()
        .find(|(from, _)| *from == trimmed)
        .map(|(_, to)| (*to).to_string())
        .unwrap_or_else(|| trimmed.to_string())
}

/// Apply [`normalize_header`] to every header, preserving order.
pub fn normalize_headers<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    raw.iter().map(|h| normalize_header(h.as_ref())).collect()
}

/// Whether a canonical column is one of the plotted curves.
pub fn is_curve_column(name: &str) -> bool {
    CURVE_COLUMNS.contains(&name)
}
