mod app_config;

pub use app_config::{
    AdmissionConfig, AppConfig, AuthConfig, LogFormat, LoggingConfig, MetricsConfig, OcrConfig,
    ServerConfig, StorageBackend, StorageConfig, UploadConfig,
};
