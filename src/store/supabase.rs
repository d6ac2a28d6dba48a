//! Supabase (PostgREST) table-insert client.

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;

use super::{SalesStore, StoreError, REPORTS_TABLE, SALES_TABLE};
use crate::models::report::NewReport;
use crate::models::sale::NormalizedSale;

/// Inserts rows through the project's REST endpoint using the service key.
#[derive(Clone)]
pub struct SupabaseStore {
    http: reqwest::Client,
    base_url: String,
    key: String,
}

impl fmt::Debug for SupabaseStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupabaseStore")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl SupabaseStore {
    pub fn new(base_url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            key: key.into(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.key)
            .header("Authorization", format!("Bearer {}", self.key))
    }

    async fn insert<T: Serialize + ?Sized>(&self, table: &str, rows: &T) -> Result<(), StoreError> {
        let resp = self
            .authorized(self.http.post(self.table_url(table)))
            .header("Prefer", "return=minimal")
            .json(rows)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v["message"].as_str().map(str::to_string))
            .unwrap_or(body);

        tracing::warn!(table, status = %status, error = %message, "Supabase insert rejected");
        Err(StoreError::Rejected {
            table: table.to_string(),
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl SalesStore for SupabaseStore {
    async fn insert_sales(&self, sales: &[NormalizedSale]) -> Result<usize, StoreError> {
        self.insert(SALES_TABLE, sales).await?;
        Ok(sales.len())
    }

    async fn insert_report(&self, report: &NewReport) -> Result<(), StoreError> {
        self.insert(REPORTS_TABLE, std::slice::from_ref(report)).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let resp = self
            .authorized(self.http.get(format!("{}/rest/v1/", self.base_url)))
            .send()
            .await?;
        resp.error_for_status()?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "supabase"
    }
}
