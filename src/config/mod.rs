use std::env;
use std::path::PathBuf;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
}

/// Persistence backend selected by the configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreBackend<'a> {
    Supabase { url: &'a str, key: &'a str },
    Postgres { url: &'a str, max_connections: u32 },
    Disabled,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            upload_dir: PathBuf::from("tmp_uploads"),
            max_upload_bytes: 10 * 1024 * 1024,
            supabase_url: None,
            supabase_key: None,
            database_url: None,
            database_max_connections: 10,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, env::VarError> {
        Self::from_lookup(|key| env::var(key))
    }

    /// Build the configuration from any key lookup shaped like `env::var`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, env::VarError>
    where
        F: Fn(&str) -> Result<String, env::VarError>,
    {
        let optional = |key: &str| match lookup(key) {
            Ok(value) if value.trim().is_empty() => Ok(None),
            Ok(value) => Ok(Some(value.trim().to_string())),
            Err(env::VarError::NotPresent) => Ok(None),
            Err(e) => Err(e),
        };
        let defaults = Self::default();

        Ok(Self {
            host: optional("BACKEND_HOST")?.unwrap_or(defaults.host),
            port: optional("PORT")?
                .or(optional("BACKEND_PORT")?)
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            upload_dir: optional("UPLOAD_DIR")?
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            max_upload_bytes: optional("MAX_UPLOAD_BYTES")?
                .and_then(|n| n.parse().ok())
                .unwrap_or(defaults.max_upload_bytes),
            supabase_url: optional("SUPABASE_URL")?,
            supabase_key: optional("SUPABASE_KEY")?,
            database_url: optional("DATABASE_URL")?,
            database_max_connections: optional("DATABASE_MAX_CONNECTIONS")?
                .and_then(|n| n.parse().ok())
                .unwrap_or(defaults.database_max_connections),
        })
    }

    /// Supabase REST wins when both URL and key are set; a bare database URL
    /// selects direct Postgres; otherwise persistence is off.
    pub fn store_backend(&self) -> StoreBackend<'_> {
        match (&self.supabase_url, &self.supabase_key, &self.database_url) {
            (Some(url), Some(key), _) => StoreBackend::Supabase { url, key },
            (_, _, Some(url)) => StoreBackend::Postgres {
                url,
                max_connections: self.database_max_connections,
            },
            _ => StoreBackend::Disabled,
        }
    }
}
