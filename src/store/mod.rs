//! Persistence collaborators for uploaded sales and saved reports.
//!
//! The store is optional. It is built once at startup from [`AppConfig`]
//! and handed to handlers through application state, so tests can swap in
//! an in-memory double.

pub mod postgres;
pub mod supabase;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{AppConfig, StoreBackend};
use crate::models::report::NewReport;
use crate::models::sale::NormalizedSale;

pub use postgres::PgStore;
pub use supabase::SupabaseStore;

/// Table holding normalized sale rows.
pub const SALES_TABLE: &str = "sales";
/// Table holding saved reports.
pub const REPORTS_TABLE: &str = "reports";

/// Failure reported by a persistence backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{table} insert rejected ({status}): {message}")]
    Rejected {
        table: String,
        status: u16,
        message: String,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Table-insert API over a hosted relational store.
#[async_trait]
pub trait SalesStore: Send + Sync + fmt::Debug {
    /// Insert all rows in one batch, returning how many were written.
    async fn insert_sales(&self, sales: &[NormalizedSale]) -> Result<usize, StoreError>;

    async fn insert_report(&self, report: &NewReport) -> Result<(), StoreError>;

    /// Connectivity check used by the readiness endpoint.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Short backend label for logs and health output.
    fn backend_name(&self) -> &'static str;
}

/// Shared handle to the configured store.
pub type SharedStore = Arc<dyn SalesStore>;

/// Build the store selected by the configuration, if any.
pub async fn connect(config: &AppConfig) -> Result<Option<SharedStore>, StoreError> {
    let store: SharedStore = match config.store_backend() {
        StoreBackend::Supabase { url, key } => Arc::new(SupabaseStore::new(url, key)),
        StoreBackend::Postgres {
            url,
            max_connections,
        } => Arc::new(PgStore::connect(url, max_connections).await?),
        StoreBackend::Disabled => {
            tracing::info!("No persistence configured; uploads will not be stored");
            return Ok(None);
        }
    };

    tracing::info!(backend = store.backend_name(), "Persistence enabled");
    Ok(Some(store))
}
