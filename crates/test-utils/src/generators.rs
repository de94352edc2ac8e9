//! Synthetic WHO-style reference tables.
//!
//! Values follow simple linear trends so tests can predict exactly what a
//! loaded table holds. Ages are written in the composite `years:months`
//! form the WHO downloads use.

use std::fmt::Write;

/// Raw percentile headers as found in the WHO percentile downloads.
pub const PERCENTILE_HEADERS: [&str; 5] = ["3rd", "15th", "50th", "85th", "97th"];

/// Raw SD headers as found in the WHO z-score downloads.
pub const SD_HEADERS: [&str; 7] = ["-3 SD", "-2 SD", "-1 SD", "Median", "1 SD", "2 SD", "3 SD"];

/// Raw alternate headers some z-score files carry next to the SD columns.
pub const ALTERNATE_Z_HEADERS: [&str; 5] = ["3rdd", "15thh", "Mediann", "85thh", "97thh"];

/// Median value of a band at `age_years`: `base + slope * (age - 5)`.
pub fn median_at(base: f64, slope: f64, age_years: f64) -> f64 {
    base + slope * (age_years - 5.0)
}

/// Generate a percentile CSV from `from_year` to `to_year` inclusive,
/// one row every `step_months`.
///
/// Band `i` of five sits at `median + (i - 2) * spread`.
///
/// # Example
///
/// ```
/// use test_utils::percentile_csv;
///
/// let csv = percentile_csv(5, 6, 6, 15.0, 0.5, 1.0);
/// let mut lines = csv.lines();
/// assert_eq!(lines.next(), Some("Year: Month,Month,3rd,15th,50th,85th,97th"));
/// assert_eq!(lines.next(), Some("5:0,60,13.000,14.000,15.000,16.000,17.000"));
/// assert_eq!(csv.lines().count(), 4); // header + 5:0, 5:6, 6:0
/// ```
pub fn percentile_csv(
    from_year: u32,
    to_year: u32,
    step_months: u32,
    base: f64,
    slope: f64,
    spread: f64,
) -> String {
    band_csv(&PERCENTILE_HEADERS, from_year, to_year, step_months, base, slope, spread)
}

/// Generate a z-score CSV with the seven SD columns.
pub fn zscore_csv(
    from_year: u32,
    to_year: u32,
    step_months: u32,
    base: f64,
    slope: f64,
    spread: f64,
) -> String {
    band_csv(&SD_HEADERS, from_year, to_year, step_months, base, slope, spread)
}

/// Generate a z-score CSV carrying both SD and alternate columns.
pub fn mixed_zscore_csv(from_year: u32, to_year: u32, base: f64, slope: f64, spread: f64) -> String {
    let headers: Vec<&str> = SD_HEADERS.iter().chain(ALTERNATE_Z_HEADERS.iter()).copied().collect();
    band_csv(&headers, from_year, to_year, 12, base, slope, spread)
}

fn band_csv(
    headers: &[&str],
    from_year: u32,
    to_year: u32,
    step_months: u32,
    base: f64,
    slope: f64,
    spread: f64,
) -> String {
    let mut out = String::from("Year: Month,Month");
    for header in headers {
        out.push(',');
        out.push_str(header);
    }
    out.push('\n');

    let step = step_months.max(1);
    let mut month = from_year * 12;
    while month <= to_year * 12 {
        let age = month as f64 / 12.0;
        let median = median_at(base, slope, age);
        let _ = write!(out, "{}:{},{}", month / 12, month % 12, month);

        // Bands are centred on the middle header of each family.
        let centre = (headers.len().min(SD_HEADERS.len()) / 2) as f64;
        for i in 0..headers.len() {
            let offset = if i < SD_HEADERS.len().min(headers.len()) {
                i as f64 - centre
            } else {
                (i - SD_HEADERS.len()) as f64 - 2.0
            };
            let _ = write!(out, ",{:.3}", median + offset * spread);
        }
        out.push('\n');
        month += step;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_rows() {
        let csv = percentile_csv(5, 19, 12, 15.0, 0.4, 1.0);
        // header + one row per year from 5 to 19
        assert_eq!(csv.lines().count(), 16);
        assert!(csv.lines().nth(1).unwrap().starts_with("5:0,60,13.000"));
        assert!(csv.lines().last().unwrap().starts_with("19:0,228,"));
    }

    #[test]
    fn test_zscore_median_column() {
        let csv = zscore_csv(5, 5, 12, 15.0, 0.0, 1.0);
        let row: Vec<&str> = csv.lines().nth(1).unwrap().split(',').collect();
        // Year: Month, Month, -3..3 SD
        assert_eq!(row.len(), 9);
        assert_eq!(row[5], "15.000");
        assert_eq!(row[2], "12.000");
    }

    #[test]
    fn test_mixed_headers() {
        let csv = mixed_zscore_csv(5, 6, 15.0, 0.5, 1.0);
        let header = csv.lines().next().unwrap();
        assert!(header.contains("Median,"));
        assert!(header.ends_with("Mediann,85thh,97thh"));
        let row: Vec<&str> = csv.lines().nth(1).unwrap().split(',').collect();
        // Mediann sits at the median too
        assert_eq!(row[5], row[2 + 7 + 2]);
    }
}
