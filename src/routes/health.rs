//! Health check endpoints for liveness and readiness checks.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

/// Readiness check detail.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub store: String,
}

/// Liveness check: always returns OK if the process is running.
pub async fn live() -> &'static str {
    "OK"
}

/// Readiness check: reports the store backend and whether it answers.
pub async fn ready(State(state): State<AppState>) -> Json<HealthStatus> {
    let store_status = match &state.store {
        None => "disabled".to_string(),
        Some(store) => match store.ping().await {
            Ok(()) => format!("{}: connected", store.backend_name()),
            Err(e) => {
                tracing::warn!(backend = store.backend_name(), error = %e, "Store health check failed");
                format!("{}: error: {e}", store.backend_name())
            }
        },
    };

    Json(HealthStatus {
        status: "ok".to_string(),
        store: store_status,
    })
}
