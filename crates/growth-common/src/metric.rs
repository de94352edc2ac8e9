//! Catalog and chart keys: body metric, sex and reference table kind.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Body measurement a reference table describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyMetric {
    Bmi,
    Height,
    Weight,
}

impl BodyMetric {
    pub const ALL: [BodyMetric; 3] = [BodyMetric::Bmi, BodyMetric::Height, BodyMetric::Weight];

    pub fn slug(&self) -> &'static str {
        match self {
            BodyMetric::Bmi => "bmi",
            BodyMetric::Height => "height",
            BodyMetric::Weight => "weight",
        }
    }
}

/// Sex split of the WHO reference tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Boys,
    Girls,
}

impl Sex {
    pub const ALL: [Sex; 2] = [Sex::Boys, Sex::Girls];

    /// Map a free-form gender string from the report to a table sex.
    ///
    /// Only a case-insensitive "male" selects the boys tables; every other
    /// value, including empty and unknown ones, selects the girls tables.
    pub fn from_gender(gender: &str) -> Self {
        if gender.trim().eq_ignore_ascii_case("male") {
            Sex::Boys
        } else {
            Sex::Girls
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Sex::Boys => "boys",
            Sex::Girls => "girls",
        }
    }
}

/// Whether a table holds percentile bands or standard-deviation bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Percentile,
    ZScore,
}

impl TableKind {
    pub const ALL: [TableKind; 2] = [TableKind::Percentile, TableKind::ZScore];

    pub fn slug(&self) -> &'static str {
        match self {
            TableKind::Percentile => "per",
            TableKind::ZScore => "z",
        }
    }
}

/// Identifies one reference table: (metric, sex, kind).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CatalogKey {
    pub metric: BodyMetric,
    pub sex: Sex,
    pub kind: TableKind,
}

impl CatalogKey {
    pub fn new(metric: BodyMetric, sex: Sex, kind: TableKind) -> Self {
        Self { metric, sex, kind }
    }

    /// All twelve keys, metric-major.
    pub fn all() -> Vec<CatalogKey> {
        let mut keys = Vec::with_capacity(12);
        for metric in BodyMetric::ALL {
            for sex in Sex::ALL {
                for kind in TableKind::ALL {
                    keys.push(CatalogKey::new(metric, sex, kind));
                }
            }
        }
        keys
    }
}

impl fmt::Display for CatalogKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.metric.slug(), self.sex.slug(), self.kind.slug())
    }
}

/// Identifies one rendered chart: (metric, kind).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChartKey {
    pub metric: BodyMetric,
    pub kind: TableKind,
}

impl ChartKey {
    pub fn new(metric: BodyMetric, kind: TableKind) -> Self {
        Self { metric, kind }
    }

    /// The six charts of a comparison, in rendering order.
    pub fn all() -> [ChartKey; 6] {
        [
            ChartKey::new(BodyMetric::Bmi, TableKind::Percentile),
            ChartKey::new(BodyMetric::Bmi, TableKind::ZScore),
            ChartKey::new(BodyMetric::Height, TableKind::Percentile),
            ChartKey::new(BodyMetric::Height, TableKind::ZScore),
            ChartKey::new(BodyMetric::Weight, TableKind::Percentile),
            ChartKey::new(BodyMetric::Weight, TableKind::ZScore),
        ]
    }

    /// Stable name, e.g. `bmi_chart_per`.
    pub fn slug(&self) -> String {
        format!("{}_chart_{}", self.metric.slug(), self.kind.slug())
    }

    pub fn catalog_key(&self, sex: Sex) -> CatalogKey {
        CatalogKey::new(self.metric, sex, self.kind)
    }

    /// Y axis label.
    pub fn metric_label(&self) -> &'static str {
        match (self.metric, self.kind) {
            (BodyMetric::Bmi, TableKind::Percentile) => "BMI",
            (BodyMetric::Bmi, TableKind::ZScore) => "BMI Z-Score",
            (BodyMetric::Height, TableKind::Percentile) => "Height (cm)",
            (BodyMetric::Height, TableKind::ZScore) => "Height Z-Score",
            (BodyMetric::Weight, TableKind::Percentile) => "Weight (kg)",
            (BodyMetric::Weight, TableKind::ZScore) => "Weight Z-Score",
        }
    }

    pub fn title(&self) -> &'static str {
        match (self.metric, self.kind) {
            (BodyMetric::Bmi, TableKind::Percentile) => "BMI Chart",
            (BodyMetric::Bmi, TableKind::ZScore) => "BMI Z-Score Chart",
            (BodyMetric::Height, TableKind::Percentile) => "Height Chart",
            (BodyMetric::Height, TableKind::ZScore) => "Height Z-Score Chart",
            (BodyMetric::Weight, TableKind::Percentile) => "Weight Chart",
            (BodyMetric::Weight, TableKind::ZScore) => "Weight Z-Score Chart",
        }
    }
}

impl fmt::Display for ChartKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.slug())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_key() {
        assert_eq!(Sex::from_gender("Male"), Sex::Boys);
        assert_eq!(Sex::from_gender("male"), Sex::Boys);
        assert_eq!(Sex::from_gender("MALE "), Sex::Boys);
        assert_eq!(Sex::from_gender("Female"), Sex::Girls);
        assert_eq!(Sex::from_gender(""), Sex::Girls);
        assert_eq!(Sex::from_gender("Unknown"), Sex::Girls);
    }

    #[test]
    fn test_all_catalog_keys_unique() {
        let keys = CatalogKey::all();
        assert_eq!(keys.len(), 12);
        let unique: std::collections::HashSet<_> = keys.iter().collect();
        assert_eq!(unique.len(), 12);
    }

    #[test]
    fn test_chart_slugs() {
        let slugs: Vec<String> = ChartKey::all().iter().map(|k| k.slug()).collect();
        assert_eq!(
            slugs,
            vec![
                "bmi_chart_per",
                "bmi_chart_z",
                "height_chart_per",
                "height_chart_z",
                "weight_chart_per",
                "weight_chart_z",
            ]
        );
    }

    #[test]
    fn test_catalog_key_display() {
        let key = CatalogKey::new(BodyMetric::Weight, Sex::Girls, TableKind::ZScore);
        assert_eq!(key.to_string(), "weight/girls/z");
    }
}
