//! Composite `years:months` age parsing.

use growth_common::{GrowthError, GrowthResult};

/// Convert `"<years>:<months>"` into fractional years.
///
/// `"5:6"` is 5.5. Input that does not split into exactly two integer parts
/// is a [`GrowthError::Parse`]; callers treat it as a missing age.
pub fn parse_age(year_month: &str) -> GrowthResult<f64> {
    let mut parts = year_month.split(':');
    let (years, months) = match (parts.next(), parts.next(), parts.next()) {
        (Some(y), Some(m), None) => (y, m),
        _ => {
            return Err(GrowthError::Parse(format!(
                "age '{}' is not in years:months form",
                year_month
            )))
        }
    };

    let years: i64 = years
        .trim()
        .parse()
        .map_err(|_| GrowthError::Parse(format!("invalid years in age '{}'", year_month)))?;
    let months: i64 = months
        .trim()
        .parse()
        .map_err(|_| GrowthError::Parse(format!("invalid months in age '{}'", year_month)))?;

    Ok(years as f64 + months as f64 / 12.0)
}

/// Parse an age cell, returning `None` for anything unparsable.
pub(crate) fn parse_age_cell(cell: &str, composite: bool) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    if composite || cell.contains(':') {
        parse_age(cell).ok()
    } else {
        cell.parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_age() {
        assert_eq!(parse_age("5:6").unwrap(), 5.5);
        assert_eq!(parse_age("5:0").unwrap(), 5.0);
        assert_eq!(parse_age("19:0").unwrap(), 19.0);
        assert!((parse_age("7:1").unwrap() - (7.0 + 1.0 / 12.0)).abs() < 1e-12);
    }

    #[test]
    fn test_all_months() {
        for years in 0..20 {
            for months in 0..12 {
                let parsed = parse_age(&format!("{}:{}", years, months)).unwrap();
                let expected = years as f64 + months as f64 / 12.0;
                assert!((parsed - expected).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_malformed_ages() {
        for bad in ["abc", "5", "5:6:7", "", ":", "5:", "a:b", "5.5:1"] {
            assert!(
                matches!(parse_age(bad), Err(GrowthError::Parse(_))),
                "{:?} should fail",
                bad
            );
        }
    }

    #[test]
    fn test_whitespace_tolerated() {
        assert_eq!(parse_age(" 8 : 3 ").unwrap(), 8.25);
    }

    #[test]
    fn test_age_cell() {
        assert_eq!(parse_age_cell("5:6", true), Some(5.5));
        assert_eq!(parse_age_cell("5", true), None);
        assert_eq!(parse_age_cell("5.25", false), Some(5.25));
        assert_eq!(parse_age_cell("6:0", false), Some(6.0));
        assert_eq!(parse_age_cell("", false), None);
        assert_eq!(parse_age_cell("n/a", false), None);
    }
}
