//! Shared helpers for integration tests: an in-memory store and a server
//! bound to a random local port.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::net::TcpListener;

use velvero::config::AppConfig;
use velvero::models::report::NewReport;
use velvero::models::sale::NormalizedSale;
use velvero::store::{SalesStore, SharedStore, StoreError};
use velvero::{routes, AppState};

/// In-memory stand-in for the hosted store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub sales: Mutex<Vec<NormalizedSale>>,
    pub reports: Mutex<Vec<NewReport>>,
    pub fail: bool,
}

impl MemoryStore {
    #[allow(dead_code)]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn rejected(table: &str) -> StoreError {
        StoreError::Rejected {
            table: table.to_string(),
            status: 401,
            message: "Invalid API key".to_string(),
        }
    }
}

#[async_trait]
impl SalesStore for MemoryStore {
    async fn insert_sales(&self, sales: &[NormalizedSale]) -> Result<usize, StoreError> {
        if self.fail {
            return Err(Self::rejected("sales"));
        }
        self.sales.lock().unwrap().extend_from_slice(sales);
        Ok(sales.len())
    }

    async fn insert_report(&self, report: &NewReport) -> Result<(), StoreError> {
        if self.fail {
            return Err(Self::rejected("reports"));
        }
        self.reports.lock().unwrap().push(report.clone());
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

/// A running API server and the upload directory it spools into.
pub struct TestServer {
    pub base_url: String,
    pub upload_dir: tempfile::TempDir,
    pub handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Files still sitting in the upload directory.
    #[allow(dead_code)]
    pub fn spooled_files(&self) -> usize {
        std::fs::read_dir(self.upload_dir.path())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Spin up the full Axum app on a random port with the given store.
pub async fn start_server(store: Option<Arc<MemoryStore>>) -> TestServer {
    start_server_with(store, AppConfig::default().max_upload_bytes).await
}

pub async fn start_server_with(store: Option<Arc<MemoryStore>>, max_upload_bytes: usize) -> TestServer {
    let upload_dir = tempfile::tempdir().expect("upload dir");
    let config = AppConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        upload_dir: upload_dir.path().to_path_buf(),
        max_upload_bytes,
        ..AppConfig::default()
    };

    let state = AppState {
        config,
        store: store.map(|s| s as SharedStore),
    };
    let app = routes::router(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server");
    });

    TestServer {
        base_url: format!("http://{addr}"),
        upload_dir,
        handle,
    }
}

/// Multipart form carrying `data` as the `file` field.
#[allow(dead_code)]
pub fn csv_form(data: &str) -> reqwest::multipart::Form {
    let part = reqwest::multipart::Part::bytes(data.as_bytes().to_vec())
        .file_name("sales.csv")
        .mime_str("text/csv")
        .expect("mime");
    reqwest::multipart::Form::new().part("file", part)
}
