//! Upload pipeline: read the spooled file, parse it, derive KPIs and
//! insights, and optionally persist the normalized rows.
//!
//! Each call works on its own request-scoped data. The spooled file is
//! removed as soon as it has been read, whether or not processing succeeds.

use std::path::{Path, PathBuf};

use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::kpi::KpiSummary;
use crate::models::sale::{NormalizedSale, RawRow};
use crate::parsers::SalesCsvParser;
use crate::services::{insights, kpi, normalizer};
use crate::store::SalesStore;

/// Number of raw rows echoed back in the response.
pub const SAMPLE_ROWS: usize = 5;

/// An uploaded file written to the upload directory.
#[derive(Debug, Clone)]
pub struct SpooledUpload {
    pub path: PathBuf,
    pub file_name: String,
    pub size: u64,
}

impl SpooledUpload {
    /// Reserve a fresh, collision-free path in `dir` for an upload.
    pub fn reserve(dir: &Path, file_name: &str) -> Self {
        Self {
            path: dir.join(format!("{}.upload", Uuid::new_v4())),
            file_name: file_name.to_string(),
            size: 0,
        }
    }
}

/// Parsed rows together with the metrics derived from them.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub rows: Vec<RawRow>,
    pub kpis: KpiSummary,
    pub insights: String,
}

/// Outcome of writing the normalized rows, reported inline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inserted: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StoreOutcome {
    pub fn inserted(count: usize) -> Self {
        Self {
            success: true,
            inserted: Some(count),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            inserted: None,
            error: Some(error.into()),
        }
    }
}

/// Response body of `POST /api/upload`.
#[derive(Debug, Serialize)]
pub struct UploadReport {
    pub rows: usize,
    pub sample: Vec<RawRow>,
    pub kpis: KpiSummary,
    pub insights: String,
    #[serde(rename = "supabaseResult", skip_serializing_if = "Option::is_none")]
    pub store_result: Option<StoreOutcome>,
}

/// Parse a CSV payload and derive its KPIs and narrative.
pub fn analyze(data: &[u8]) -> Result<Analysis, AppError> {
    let rows = SalesCsvParser::new()
        .parse(data)
        .map_err(|e| AppError::Parse(e.to_string()))?;
    let kpis = kpi::summarize(&rows);
    let insights = insights::generate(&kpis);
    Ok(Analysis {
        rows,
        kpis,
        insights,
    })
}

/// Normalize and insert every row in one batch. Failures are returned as
/// an outcome rather than an error so the KPIs still reach the client.
pub async fn persist_sales(store: &dyn SalesStore, rows: &[RawRow]) -> StoreOutcome {
    if rows.is_empty() {
        return StoreOutcome::inserted(0);
    }

    let sales: Vec<NormalizedSale> = rows.iter().map(normalizer::normalize).collect();
    match store.insert_sales(&sales).await {
        Ok(count) => {
            tracing::info!(backend = store.backend_name(), inserted = count, "Stored sales rows");
            StoreOutcome::inserted(count)
        }
        Err(e) => {
            tracing::warn!(backend = store.backend_name(), error = %e, "Failed to store sales rows");
            StoreOutcome::failed(e.to_string())
        }
    }
}

/// Remove a spooled file. Failure is logged and otherwise ignored.
pub async fn discard(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::debug!(path = %path.display(), error = %e, "Could not remove spooled upload");
    }
}

/// Run the full pipeline for a spooled upload.
pub async fn process_upload(
    store: Option<&dyn SalesStore>,
    upload: &SpooledUpload,
) -> Result<UploadReport, AppError> {
    let data = tokio::fs::read(&upload.path).await;
    discard(&upload.path).await;
    let data = data.map_err(|e| AppError::Internal(format!("Failed to read upload: {e}")))?;

    let Analysis {
        rows,
        kpis,
        insights,
    } = analyze(&data)?;

    tracing::info!(
        file_name = %upload.file_name,
        bytes = upload.size,
        rows = rows.len(),
        revenue = kpis.revenue,
        "Analyzed sales upload"
    );

    let store_result = match store {
        Some(store) => Some(persist_sales(store, &rows).await),
        None => None,
    };

    Ok(UploadReport {
        rows: rows.len(),
        sample: rows.iter().take(SAMPLE_ROWS).cloned().collect(),
        kpis,
        insights,
        store_result,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use crate::models::report::NewReport;
    use crate::store::StoreError;

    #[derive(Debug, Default)]
    struct RecordingStore {
        sales: Mutex<Vec<NormalizedSale>>,
        fail: bool,
    }

    #[async_trait]
    impl SalesStore for RecordingStore {
        async fn insert_sales(&self, sales: &[NormalizedSale]) -> Result<usize, StoreError> {
            if self.fail {
                return Err(StoreError::Rejected {
                    table: "sales".to_string(),
                    status: 401,
                    message: "Invalid API key".to_string(),
                });
            }
            self.sales.lock().unwrap().extend_from_slice(sales);
            Ok(sales.len())
        }

        async fn insert_report(&self, _report: &NewReport) -> Result<(), StoreError> {
            Ok(())
        }

        async fn ping(&self) -> Result<(), StoreError> {
            Ok(())
        }

        fn backend_name(&self) -> &'static str {
            "recording"
        }
    }

    async fn spool(dir: &Path, contents: &str) -> SpooledUpload {
        let mut upload = SpooledUpload::reserve(dir, "sales.csv");
        tokio::fs::write(&upload.path, contents).await.unwrap();
        upload.size = contents.len() as u64;
        upload
    }

    #[test]
    fn analyze_example_file() {
        let analysis = analyze(b"sku,quantity,unit_price\nA,2,10\nB,1,5\n").unwrap();
        assert_eq!(analysis.rows.len(), 2);
        assert_eq!(
            serde_json::to_value(&analysis.kpis).unwrap(),
            json!({
                "revenue": 25,
                "orders": 2,
                "aov": 12.5,
                "top_skus": [{"sku": "A", "qty": 2}, {"sku": "B", "qty": 1}]
            })
        );
        assert!(analysis.insights.contains("Top SKU: A (qty 2)"));
    }

    #[test]
    fn analyze_fixture_file() {
        let data = include_bytes!("../../tests/fixtures/cafe_sales.csv");
        let analysis = analyze(data).unwrap();
        assert_eq!(analysis.kpis.orders, 8);
        assert_eq!(analysis.kpis.revenue, 1293.35);
        assert_eq!(analysis.kpis.aov, 161.67);
        let top: Vec<(&str, f64)> = analysis
            .kpis
            .top_skus
            .iter()
            .map(|s| (s.sku.as_str(), s.qty))
            .collect();
        assert_eq!(
            top,
            vec![("FW-01", 5.0), ("TEA-06", 4.0), ("LT-03", 3.0), ("BN-04", 2.0), ("SC-02", 1.0)]
        );
    }

    #[test]
    fn analyze_rejects_ragged_csv() {
        let err = analyze(b"sku,qty\nA\n").unwrap_err();
        assert!(matches!(err, AppError::Parse(_)));
    }

    #[tokio::test]
    async fn process_removes_spooled_file_and_samples_five_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut csv = String::from("sku,amount\n");
        for i in 0..7 {
            csv.push_str(&format!("S{i},1\n"));
        }
        let upload = spool(dir.path(), &csv).await;

        let report = process_upload(None, &upload).await.unwrap();
        assert_eq!(report.rows, 7);
        assert_eq!(report.sample.len(), SAMPLE_ROWS);
        assert_eq!(report.sample[0].get("sku"), Some("S0"));
        assert!(report.store_result.is_none());
        assert!(!upload.path.exists());

        let body = serde_json::to_value(&report).unwrap();
        assert!(body.get("supabaseResult").is_none());
    }

    #[tokio::test]
    async fn process_removes_spooled_file_on_parse_failure() {
        let dir = tempfile::tempdir().unwrap();
        let upload = spool(dir.path(), "a,b\n1,2,3\n").await;

        let err = process_upload(None, &upload).await.unwrap_err();
        assert!(matches!(err, AppError::Parse(_)));
        assert!(!upload.path.exists());
    }

    #[tokio::test]
    async fn process_missing_file_is_internal_error() {
        let dir = tempfile::tempdir().unwrap();
        let upload = SpooledUpload::reserve(dir.path(), "gone.csv");
        let err = process_upload(None, &upload).await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[tokio::test]
    async fn process_persists_normalized_rows() {
        let dir = tempfile::tempdir().unwrap();
        let upload = spool(dir.path(), "sku,qty,price\nA,2,3\n,1,4\n").await;
        let store = RecordingStore::default();

        let report = process_upload(Some(&store), &upload).await.unwrap();
        assert_eq!(report.store_result, Some(StoreOutcome::inserted(2)));

        let stored = store.sales.lock().unwrap();
        assert_eq!(stored[0].sku, "A");
        assert_eq!(stored[0].total_amount, Some(6.0));
        assert_eq!(stored[1].sku, "UNKNOWN");
    }

    #[tokio::test]
    async fn store_failure_is_reported_inline() {
        let dir = tempfile::tempdir().unwrap();
        let upload = spool(dir.path(), "sku,amount\nA,5\n").await;
        let store = RecordingStore {
            fail: true,
            ..RecordingStore::default()
        };

        let report = process_upload(Some(&store), &upload).await.unwrap();
        assert_eq!(report.kpis.revenue, 5.0);
        let outcome = report.store_result.unwrap();
        assert!(!outcome.success);
        assert!(outcome.error.unwrap().contains("Invalid API key"));
    }

    #[tokio::test]
    async fn empty_upload_skips_the_store() {
        let store = RecordingStore {
            fail: true,
            ..RecordingStore::default()
        };
        assert_eq!(persist_sales(&store, &[]).await, StoreOutcome::inserted(0));
    }

    #[tokio::test]
    async fn discard_ignores_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        discard(&dir.path().join("never-written")).await;
    }
}
