//! RPA item user-field codes and the write-back payload.

use std::collections::BTreeMap;

use serde_json::{json, Value};

use growth_common::{BodyMetric, ChartKey, ChildRecord, TableKind};

pub const WEIGHT: &str = "UF_RPA_1_WEIGHT";
pub const HEIGHT: &str = "UF_RPA_1_HEIGHT";
pub const BMI: &str = "UF_RPA_1_1734279376";
pub const AGE: &str = "UF_RPA_1_1734278050";
pub const REPORT_LINK: &str = "UF_RPA_1_1733491182";
pub const GENDER: &str = "UF_RPA_1_1738508202";

pub const BMI_CHART_PER: &str = "UF_RPA_1_1738508402";
pub const BMI_CHART_Z: &str = "UF_RPA_1_1738508416";
pub const HEIGHT_CHART_PER: &str = "UF_RPA_1_1738508425";
pub const HEIGHT_CHART_Z: &str = "UF_RPA_1_1738508434";
pub const WEIGHT_CHART_PER: &str = "UF_RPA_1_1738508444";
pub const WEIGHT_CHART_Z: &str = "UF_RPA_1_1738508458";

pub const SCORE: &str = "UF_RPA_1_1738508088";
pub const ECF: &str = "UF_RPA_1_1738508230";
pub const CF: &str = "UF_RPA_1_1738508241";
pub const PROTEIN: &str = "UF_RPA_1_1738508249";
pub const MINERALS: &str = "UF_RPA_1_1738508256";
pub const FAT: &str = "UF_RPA_1_1738508263";
pub const BODY_WATER: &str = "UF_RPA_1_1738508271";
pub const SOFT_LEAN_MASS: &str = "UF_RPA_1_1738508280";
pub const FAT_FREE_MASS: &str = "UF_RPA_1_1738508290";
pub const SMM: &str = "UF_RPA_1_1738508302";
pub const BODY_FAT_MASS: &str = "UF_RPA_1_1738508319";
pub const BASAL_METABOLIC_RATE: &str = "UF_RPA_1_1738508352";
pub const BONE_MINERAL: &str = "UF_RPA_1_1738508366";
pub const WAIST_HIP_RATIO: &str = "UF_RPA_1_1738508379";
pub const VISCERAL_FAT_LEVEL: &str = "UF_RPA_1_1738508390";
pub const PBF: &str = "UF_RPA_1_1738508329";

/// Field holding the URL of a chart.
pub fn chart_field(key: ChartKey) -> &'static str {
    match (key.metric, key.kind) {
        (BodyMetric::Bmi, TableKind::Percentile) => BMI_CHART_PER,
        (BodyMetric::Bmi, TableKind::ZScore) => BMI_CHART_Z,
        (BodyMetric::Height, TableKind::Percentile) => HEIGHT_CHART_PER,
        (BodyMetric::Height, TableKind::ZScore) => HEIGHT_CHART_Z,
        (BodyMetric::Weight, TableKind::Percentile) => WEIGHT_CHART_PER,
        (BodyMetric::Weight, TableKind::ZScore) => WEIGHT_CHART_Z,
    }
}

/// One `rpa.item.update` call: which item, and the field values to set.
///
/// Fields keep insertion order. A `null` value means "unknown" (a failed
/// upload or a value missing from the report).
#[derive(Debug, Clone, PartialEq)]
pub struct WriteBackPayload {
    pub type_id: u32,
    pub item_id: String,
    pub fields: Vec<(&'static str, Value)>,
}

impl WriteBackPayload {
    /// Build the payload for a processed report.
    ///
    /// Every chart of [`ChartKey::all`] gets a field; charts missing from
    /// `chart_urls` are written as `null`.
    pub fn build(
        type_id: u32,
        item_id: impl Into<String>,
        record: &ChildRecord,
        report_link: &str,
        chart_urls: &BTreeMap<ChartKey, Option<String>>,
    ) -> Self {
        let c = &record.composition;
        let mut fields: Vec<(&'static str, Value)> = vec![
            (WEIGHT, json!(record.weight_kg)),
            (HEIGHT, json!(record.height_cm)),
            (BMI, json!(record.bmi)),
            (AGE, json!(record.age_years)),
            (REPORT_LINK, json!(report_link)),
            (GENDER, json!(record.gender)),
        ];

        for key in ChartKey::all() {
            let url = chart_urls.get(&key).cloned().flatten();
            fields.push((chart_field(key), json!(url)));
        }

        fields.extend([
            (SCORE, json!(c.score)),
            (ECF, json!(c.ecf)),
            (CF, json!(c.cf)),
            (PROTEIN, json!(c.protein)),
            (MINERALS, json!(c.minerals)),
            (FAT, json!(c.fat)),
            (BODY_WATER, json!(c.body_water)),
            (SOFT_LEAN_MASS, json!(c.soft_lean_mass)),
            (FAT_FREE_MASS, json!(c.fat_free_mass)),
            (SMM, json!(c.smm)),
            (BODY_FAT_MASS, json!(c.body_fat_mass)),
            (BASAL_METABOLIC_RATE, json!(c.basal_metabolic_rate)),
            (BONE_MINERAL, json!(c.bone_mineral)),
            (WAIST_HIP_RATIO, json!(c.waist_hip_ratio)),
            (VISCERAL_FAT_LEVEL, json!(c.visceral_fat_level)),
            (PBF, json!(c.pbf)),
        ]);

        Self {
            type_id,
            item_id: item_id.into(),
            fields,
        }
    }

    pub fn field(&self, code: &str) -> Option<&Value> {
        self.fields.iter().find(|(c, _)| *c == code).map(|(_, v)| v)
    }

    /// JSON body for bearer-authenticated calls: `{typeId, id, fields: {..}}`.
    ///
    /// Unknown values are sent as `null`.
    pub fn to_json(&self) -> Value {
        let fields: serde_json::Map<String, Value> = self
            .fields
            .iter()
            .map(|(code, value)| (code.to_string(), value.clone()))
            .collect();

        json!({
            "typeId": self.type_id,
            "id": self.item_id,
            "fields": fields,
        })
    }

    /// Form body for webhook calls: `typeId`, `id`, `fields[CODE]`.
    ///
    /// Unknown values are left out of the form.
    pub fn to_form(&self) -> Vec<(String, String)> {
        let mut form = vec![
            ("typeId".to_string(), self.type_id.to_string()),
            ("id".to_string(), self.item_id.clone()),
        ];

        form.extend(self.fields.iter().filter_map(|(code, value)| {
            let text = match value {
                Value::Null => return None,
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some((format!("fields[{}]", code), text))
        }));
        form
    }

    /// Chart URL fields in chart order.
    pub fn chart_urls(&self) -> BTreeMap<ChartKey, Option<&str>> {
        ChartKey::all()
            .into_iter()
            .map(|key| (key, self.field(chart_field(key)).and_then(Value::as_str)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use growth_common::BodyComposition;

    fn record() -> ChildRecord {
        ChildRecord {
            name: "Alex Kim".to_string(),
            age_years: 8,
            gender: "Male".to_string(),
            height_cm: 130.0,
            weight_kg: 28.0,
            bmi: 16.5,
            composition: BodyComposition {
                score: Some("78".to_string()),
                ..Default::default()
            },
        }
    }

    fn urls() -> BTreeMap<ChartKey, Option<String>> {
        ChartKey::all()
            .into_iter()
            .map(|key| {
                let url = (key.kind == TableKind::Percentile)
                    .then(|| format!("https://cdn.test/Alex_Kim_{}.png", key.slug()));
                (key, url)
            })
            .collect()
    }

    #[test]
    fn test_payload_has_every_field() {
        let payload = WriteBackPayload::build(1, "42", &record(), "https://report.test/1", &urls());
        // 6 measurements + 6 charts + 16 composition values
        assert_eq!(payload.fields.len(), 28);
        assert_eq!(payload.field(WEIGHT), Some(&json!(28.0)));
        assert_eq!(payload.field(AGE), Some(&json!(8)));
        assert_eq!(payload.field(GENDER), Some(&json!("Male")));
        assert_eq!(payload.field(SCORE), Some(&json!("78")));
        assert_eq!(payload.field(ECF), Some(&Value::Null));
    }

    #[test]
    fn test_failed_uploads_are_null() {
        let payload = WriteBackPayload::build(1, "42", &record(), "https://report.test/1", &urls());
        assert_eq!(
            payload.field(BMI_CHART_PER),
            Some(&json!("https://cdn.test/Alex_Kim_bmi_chart_per.png"))
        );
        assert_eq!(payload.field(BMI_CHART_Z), Some(&Value::Null));
        assert_eq!(payload.field(WEIGHT_CHART_Z), Some(&Value::Null));
    }

    #[test]
    fn test_missing_chart_entry_is_null() {
        let payload =
            WriteBackPayload::build(1, "42", &record(), "https://report.test/1", &BTreeMap::new());
        let charts = payload.chart_urls();
        assert_eq!(charts.len(), 6);
        assert!(charts.values().all(Option::is_none));
    }

    #[test]
    fn test_json_body() {
        let payload = WriteBackPayload::build(3, "42", &record(), "https://report.test/1", &urls());
        let body = payload.to_json();
        assert_eq!(body["typeId"], json!(3));
        assert_eq!(body["id"], json!("42"));
        assert_eq!(body["fields"][HEIGHT], json!(130.0));
        assert_eq!(body["fields"][HEIGHT_CHART_Z], Value::Null);
        assert_eq!(body["fields"].as_object().unwrap().len(), 28);
    }

    #[test]
    fn test_form_body_omits_nulls() {
        let payload = WriteBackPayload::build(1, "42", &record(), "https://report.test/1", &urls());
        let form = payload.to_form();

        assert_eq!(form[0], ("typeId".to_string(), "1".to_string()));
        assert_eq!(form[1], ("id".to_string(), "42".to_string()));
        assert!(form.contains(&("fields[UF_RPA_1_1734278050]".to_string(), "8".to_string())));
        assert!(form.contains(&("fields[UF_RPA_1_1738508202]".to_string(), "Male".to_string())));
        assert!(!form.iter().any(|(k, _)| k == "fields[UF_RPA_1_1738508416]"));
        // 2 ids + 6 measurements + 3 chart URLs + 1 score
        assert_eq!(form.len(), 12);
    }
}
