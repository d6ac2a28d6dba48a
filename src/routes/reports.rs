//! Report routes: persist an analysis under the owner's email.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::errors::AppError;
use crate::models::report::{SaveReportRequest, SaveReportResponse};
use crate::services::report;
use crate::AppState;

/// POST /api/save — store `{email, kpis, sample}` in the `reports` table.
pub async fn save(
    State(state): State<AppState>,
    payload: Result<Json<SaveReportRequest>, JsonRejection>,
) -> Result<Json<SaveReportResponse>, AppError> {
    let Json(request) =
        payload.map_err(|e| AppError::Validation(format!("Invalid request body: {e}")))?;

    report::save_report(state.store.as_deref(), request).await?;
    Ok(Json(SaveReportResponse { success: true }))
}
