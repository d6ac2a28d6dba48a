//! Saving an analysis report to the configured store.

use chrono::Utc;
use validator::Validate;

use crate::errors::AppError;
use crate::models::report::{NewReport, SaveReportRequest};
use crate::store::SalesStore;

/// Validate and store one report. Requires an email and a configured store.
pub async fn save_report(
    store: Option<&dyn SalesStore>,
    request: SaveReportRequest,
) -> Result<(), AppError> {
    request
        .validate()
        .map_err(|_| AppError::Validation("email is required".to_string()))?;

    let store = store.ok_or_else(|| {
        AppError::Validation("Persistence is not configured".to_string())
    })?;

    let report = NewReport {
        email: request.email.unwrap_or_default(),
        kpis: request.kpis,
        sample: request.sample,
        created_at: Utc::now(),
    };

    store.insert_report(&report).await?;
    tracing::info!(backend = store.backend_name(), email = %report.email, "Saved report");
    Ok(())
}
