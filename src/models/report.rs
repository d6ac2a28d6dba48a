//! Saved analysis reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body of `POST /api/save`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SaveReportRequest {
    #[serde(default)]
    #[validate(required(message = "email is required"), length(min = 1, message = "email is required"))]
    pub email: Option<String>,
    #[serde(default)]
    pub kpis: serde_json::Value,
    #[serde(default)]
    pub sample: serde_json::Value,
}

/// Row written to the `reports` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewReport {
    pub email: String,
    pub kpis: serde_json::Value,
    pub sample: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Response of a successful save.
#[derive(Debug, Serialize)]
pub struct SaveReportResponse {
    pub success: bool,
}
