use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::admission::AdmissionPolicy;
use crate::domain::document::SizeLimits;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub admission: AdmissionConfig,
    pub upload: UploadConfig,
    pub ocr: OcrConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Sliding-window limits applied per (peer address, API key)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdmissionConfig {
    pub requests_per_window: u32,
    pub window_secs: u64,
    pub block_log_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub dir: PathBuf,
    pub limits: SizeLimits,
}

/// External OCR tooling
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    pub tesseract_cmd: String,
    pub pdftoppm_cmd: String,
    pub language: String,
    pub dpi: u32,
    /// Deadline for a single tool invocation
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    InMemory,
    Postgres,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub database_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Accepted `X-API-Key` values; empty rejects every request
    pub api_keys: Vec<String>,
    /// Restricts the block log to this key when set
    pub admin_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        let policy = AdmissionPolicy::default();

        Self {
            requests_per_window: policy.requests_per_window,
            window_secs: policy.window.as_secs(),
            block_log_capacity: policy.block_log_capacity,
        }
    }
}

impl AdmissionConfig {
    pub fn policy(&self) -> AdmissionPolicy {
        AdmissionPolicy::new(self.requests_per_window, Duration::from_secs(self.window_secs))
            .with_block_log_capacity(self.block_log_capacity)
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("uploads"),
            limits: SizeLimits::default(),
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            tesseract_cmd: "tesseract".to_string(),
            pdftoppm_cmd: "pdftoppm".to_string(),
            language: "eng".to_string(),
            dpi: 200,
            timeout_secs: 120,
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl AuthConfig {
    /// A configured API key, or the admin key
    pub fn accepts(&self, key: &str) -> bool {
        self.api_keys.iter().any(|k| k == key) || self.admin_key.as_deref() == Some(key)
    }

    /// Whether `key` may read administrative data
    pub fn is_admin(&self, key: &str) -> bool {
        match &self.admin_key {
            Some(admin) => admin == key,
            None => self.accepts(key),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("auth.api_keys")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 8000);
        assert_eq!(config.admission.requests_per_window, 30);
        assert_eq!(config.admission.window_secs, 60);
        assert_eq!(config.admission.block_log_capacity, 100);
        assert_eq!(config.upload.dir, PathBuf::from("uploads"));
        assert_eq!(config.ocr.timeout_secs, 120);
        assert_eq!(config.storage.backend, StorageBackend::InMemory);
        assert!(config.auth.api_keys.is_empty());
        assert!(config.metrics.enabled);
    }

    #[test]
    fn test_partial_source_falls_back_to_defaults() {
        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(
                r#"{"server": {"port": 9000}, "storage": {"backend": "postgres"}}"#,
                config::FileFormat::Json,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.storage.backend, StorageBackend::Postgres);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_admission_policy_from_config() {
        let config = AdmissionConfig {
            requests_per_window: 5,
            window_secs: 10,
            block_log_capacity: 3,
        };

        let policy = config.policy();
        assert_eq!(policy.requests_per_window, 5);
        assert_eq!(policy.window, Duration::from_secs(10));
        assert_eq!(policy.block_log_capacity, 3);
    }

    #[test]
    fn test_admin_key_restricts_block_log() {
        let mut auth = AuthConfig {
            api_keys: vec!["user-key".to_string(), "admin-key".to_string()],
            admin_key: None,
        };
        assert!(auth.is_admin("user-key"));
        assert!(!auth.is_admin("stranger"));

        auth.admin_key = Some("admin-key".to_string());
        assert!(!auth.is_admin("user-key"));
        assert!(auth.is_admin("admin-key"));
    }
}
