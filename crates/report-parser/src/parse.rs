//! Extraction of a child record from a report page.
//!
//! Field locations are fixed by the report layout:
//!
//! | selector | index | field |
//! |---|---|---|
//! | `span.name.abs` | first | name |
//! | `span.old.abs` | first | age (whole years) |
//! | `span.sex.abs` | first | gender |
//! | `span.height.abs` | first | height (`"130 cm"`) |
//! | `div.data-text.font-size-nom.bold` | 0..=4 | weight, smm, body fat mass, bmi, pbf |
//! | `div.box` | 0 | score |
//! | `div.bold` (data-text divs included) | 1..=8 | ecf .. fat free mass |
//! | `div.td.t-center[style=..] span` | 0..=3 | bmr, bone mineral, waist-hip ratio, visceral fat |

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use growth_common::{BodyComposition, ChildRecord, GrowthError, GrowthResult};

const NAME: &str = "span.name.abs";
const AGE: &str = "span.old.abs";
const SEX: &str = "span.sex.abs";
const HEIGHT: &str = "span.height.abs";
const DATA_TEXT: &str = "div.data-text.font-size-nom.bold";
const BOX: &str = "div.box";
const ANALYSIS: &str = "div.bold";
const RIGHT_CELL: &str = r#"div.td.t-center[style="width:55%; text-align: right;"]"#;
const SPAN: &str = "span";

/// Parse a report page into a record.
///
/// Missing elements take the record's defaults. A core measurement that is
/// present but not a number fails the whole page with
/// [`GrowthError::Scrape`].
pub fn parse_report(html: &str) -> GrowthResult<ChildRecord> {
    let document = Html::parse_document(html);
    let defaults = ChildRecord::default();

    let data_texts = texts(&document, DATA_TEXT)?;
    let boxes = texts(&document, BOX)?;
    let analysis = texts(&document, ANALYSIS)?;
    let right_cells = right_cell_texts(&document)?;

    let record = ChildRecord {
        name: first_text(&document, NAME)?.unwrap_or(defaults.name),
        age_years: match first_text(&document, AGE)? {
            Some(age) => parse_field("age", &age, |s| s.parse::<u32>().ok())?,
            None => defaults.age_years,
        },
        gender: first_text(&document, SEX)?.unwrap_or(defaults.gender),
        height_cm: match first_text(&document, HEIGHT)? {
            Some(height) => parse_field("height", &height, |s| {
                s.replace("cm", "").trim().parse::<f64>().ok()
            })?,
            None => defaults.height_cm,
        },
        weight_kg: match data_texts.first() {
            Some(weight) => parse_field("weight", weight, |s| s.parse::<f64>().ok())?,
            None => defaults.weight_kg,
        },
        bmi: match data_texts.get(3) {
            Some(bmi) => parse_field("bmi", bmi, |s| s.parse::<f64>().ok())?,
            None => defaults.bmi,
        },
        composition: BodyComposition {
            score: boxes.first().cloned(),
            ecf: analysis.get(1).cloned(),
            cf: analysis.get(2).cloned(),
            protein: analysis.get(3).cloned(),
            minerals: analysis.get(4).cloned(),
            fat: analysis.get(5).cloned(),
            body_water: analysis.get(6).cloned(),
            soft_lean_mass: analysis.get(7).cloned(),
            fat_free_mass: analysis.get(8).cloned(),
            smm: data_texts.get(1).cloned(),
            body_fat_mass: data_texts.get(2).cloned(),
            pbf: data_texts.get(4).cloned(),
            basal_metabolic_rate: right_cells.first().cloned(),
            bone_mineral: right_cells.get(1).cloned(),
            waist_hip_ratio: right_cells.get(2).cloned(),
            visceral_fat_level: right_cells.get(3).cloned(),
        },
    };

    debug!(
        name = %record.name,
        age = record.age_years,
        gender = %record.gender,
        "Parsed report"
    );
    Ok(record)
}

fn selector(css: &str) -> GrowthResult<Selector> {
    Selector::parse(css).map_err(|e| GrowthError::Parse(format!("selector {}: {}", css, e)))
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn first_text(document: &Html, css: &str) -> GrowthResult<Option<String>> {
    let sel = selector(css)?;
    Ok(document.select(&sel).next().map(element_text))
}

fn texts(document: &Html, css: &str) -> GrowthResult<Vec<String>> {
    let sel = selector(css)?;
    Ok(document.select(&sel).map(element_text).collect())
}

/// Text of the first `span` inside each right-aligned table cell.
///
/// A cell without a span yields an empty string so later indices keep their
/// position.
fn right_cell_texts(document: &Html) -> GrowthResult<Vec<String>> {
    let cell = selector(RIGHT_CELL)?;
    let span = selector(SPAN)?;
    Ok(document
        .select(&cell)
        .map(|c| c.select(&span).next().map(element_text).unwrap_or_default())
        .collect())
}

fn parse_field<T>(field: &str, raw: &str, parse: impl Fn(&str) -> Option<T>) -> GrowthResult<T> {
    parse(raw.trim())
        .ok_or_else(|| GrowthError::Scrape(format!("{} is not a number: {:?}", field, raw)))
}
