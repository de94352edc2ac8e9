//! Shared fakes and fixtures for growth-api tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crm_client::{TokenStore, WriteBack, WriteBackPayload};
use growth_api::pipeline::Pipeline;
use growth_api::state::AppState;
use growth_common::{BodyMetric, CatalogKey, ChildRecord, GrowthError, GrowthResult, Sex, TableKind};
use reference_data::{ReferenceCatalog, ReferenceTable};
use report_parser::ReportSource;
use storage::ChartSink;
use test_utils::percentile_csv;

// ============================================================================
// Fakes
// ============================================================================

pub struct FakeReports {
    pub record: Option<ChildRecord>,
}

#[async_trait]
impl ReportSource for FakeReports {
    async fn fetch(&self, url: &str) -> GrowthResult<ChildRecord> {
        self.record
            .clone()
            .ok_or_else(|| GrowthError::Scrape(format!("{} returned HTTP 404", url)))
    }
}

#[derive(Default)]
pub struct RecordingSink {
    /// Chart slugs whose upload fails.
    pub fail_slugs: Vec<&'static str>,
    pub uploads: Mutex<Vec<(PathBuf, String)>>,
}

#[async_trait]
impl ChartSink for RecordingSink {
    async fn upload(&self, local: &Path, dest: &str) -> GrowthResult<String> {
        if !local.exists() {
            return Err(GrowthError::Upload(format!("{} missing", local.display())));
        }
        if self.fail_slugs.iter().any(|slug| dest.ends_with(&format!("_{}.png", slug))) {
            return Err(GrowthError::Upload("bucket unavailable".to_string()));
        }
        self.uploads
            .lock()
            .unwrap()
            .push((local.to_path_buf(), dest.to_string()));
        Ok(format!("https://storage.test/charts/{}", dest))
    }
}

#[derive(Default)]
pub struct RecordingCrm {
    pub fail: bool,
    pub payloads: Mutex<Vec<WriteBackPayload>>,
}

#[async_trait]
impl WriteBack for RecordingCrm {
    async fn update_item(&self, payload: &WriteBackPayload) -> GrowthResult<()> {
        if self.fail {
            return Err(GrowthError::ExternalCall("CRM returned HTTP 500".to_string()));
        }
        self.payloads.lock().unwrap().push(payload.clone());
        Ok(())
    }
}

// ============================================================================
// Helpers
// ============================================================================

pub fn alex() -> ChildRecord {
    ChildRecord {
        name: "Alex Kim".to_string(),
        age_years: 8,
        gender: "Male".to_string(),
        height_cm: 130.0,
        weight_kg: 28.0,
        bmi: 16.5,
        ..Default::default()
    }
}

/// Catalog with only the boys BMI percentile table.
pub fn bmi_boys_catalog() -> ReferenceCatalog {
    let table =
        ReferenceTable::from_csv(percentile_csv(5, 19, 6, 15.3, 0.4, 1.0).as_bytes()).unwrap();
    ReferenceCatalog::from_tables([(
        CatalogKey::new(BodyMetric::Bmi, Sex::Boys, TableKind::Percentile),
        table,
    )])
}

pub fn pipeline(
    catalog: ReferenceCatalog,
    record: Option<ChildRecord>,
    sink: Arc<RecordingSink>,
    crm: Arc<RecordingCrm>,
    output_dir: &Path,
) -> Pipeline {
    Pipeline {
        catalog: Arc::new(catalog),
        reports: Arc::new(FakeReports { record }),
        sink,
        crm,
        output_dir: output_dir.to_path_buf(),
        type_id: 1,
    }
}

/// Application state around the fakes; no OAuth client, empty token store.
pub fn app_state(
    catalog: ReferenceCatalog,
    record: Option<ChildRecord>,
    crm: Arc<RecordingCrm>,
    output_dir: &Path,
) -> AppState {
    AppState {
        catalog: Arc::new(catalog),
        reports: Arc::new(FakeReports { record }),
        sink: Arc::new(RecordingSink::default()),
        webhook_crm: Some(crm.clone()),
        oauth_crm: Some(crm),
        crm_user: None,
        oauth: None,
        tokens: Arc::new(TokenStore::new()),
        output_dir: output_dir.to_path_buf(),
        rpa_type_id: 1,
    }
}
