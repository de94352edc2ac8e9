//! The child measurements extracted from a body-composition report.

use serde::{Deserialize, Serialize};

use crate::metric::{BodyMetric, Sex};

/// One child's report, as extracted from the third-party page.
///
/// Default policy when the page lacks an element:
/// - `name`: `"Unknown"`
/// - `age_years`: `0`
/// - `gender`: `"Unknown"` (selects the girls tables)
/// - `height_cm`, `weight_kg`, `bmi`: `0.0`
/// - body-composition pass-through fields: `None`, written back as null
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildRecord {
    pub name: String,
    pub age_years: u32,
    /// Gender text exactly as shown on the report.
    pub gender: String,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub bmi: f64,
    #[serde(default)]
    pub composition: BodyComposition,
}

impl Default for ChildRecord {
    fn default() -> Self {
        Self {
            name: "Unknown".to_string(),
            age_years: 0,
            gender: "Unknown".to_string(),
            height_cm: 0.0,
            weight_kg: 0.0,
            bmi: 0.0,
            composition: BodyComposition::default(),
        }
    }
}

impl ChildRecord {
    pub fn sex(&self) -> Sex {
        Sex::from_gender(&self.gender)
    }

    /// Measurement plotted against the tables of `metric`.
    pub fn value_for(&self, metric: BodyMetric) -> f64 {
        match metric {
            BodyMetric::Bmi => self.bmi,
            BodyMetric::Height => self.height_cm,
            BodyMetric::Weight => self.weight_kg,
        }
    }

    /// Name with spaces replaced, used in uploaded object names.
    pub fn file_safe_name(&self) -> String {
        self.name.replace(' ', "_")
    }
}

/// Body-composition values carried through to the CRM unchanged.
///
/// Values keep the report's text (units and all) since they are never
/// computed on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyComposition {
    pub score: Option<String>,
    pub ecf: Option<String>,
    pub cf: Option<String>,
    pub protein: Option<String>,
    pub minerals: Option<String>,
    pub fat: Option<String>,
    pub body_water: Option<String>,
    pub soft_lean_mass: Option<String>,
    pub fat_free_mass: Option<String>,
    pub smm: Option<String>,
    pub body_fat_mass: Option<String>,
    pub pbf: Option<String>,
    pub basal_metabolic_rate: Option<String>,
    pub bone_mineral: Option<String>,
    pub waist_hip_ratio: Option<String>,
    pub visceral_fat_level: Option<String>,
}
