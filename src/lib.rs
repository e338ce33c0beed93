//! Claim Intake
//!
//! Claim document ingestion service:
//! - Upload validation by content sniffing and per-type size limits
//! - OCR text extraction for images and scanned PDFs
//! - Best-effort claim field parsing with two-phase persistence
//! - Per-caller sliding-window admission control

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use api::state::AppState;
use config::StorageBackend;
use domain::claim::ClaimRepository;
use domain::document::ContentSniffer;
use domain::extraction::TextExtractor;
use infrastructure::{
    admission::AdmissionController,
    claim::{InMemoryClaimRepository, PostgresClaimRepository, PostgresConfig},
    document::{DocumentValidator, MagicByteSniffer},
    extraction::{OcrTextExtractor, PdftoppmRasterizer, TesseractEngine},
    services::{ClaimService, IngestionOrchestrator},
};

/// Create the application state with all services initialized
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    tokio::fs::create_dir_all(&config.upload.dir)
        .await
        .with_context(|| format!("creating upload dir {}", config.upload.dir.display()))?;

    let repository = create_repository(config).await?;
    let sniffer: Arc<dyn ContentSniffer> = Arc::new(MagicByteSniffer::new());

    let claims = Arc::new(ClaimService::new(
        repository.clone(),
        create_validator(config, sniffer.clone()),
    ));
    let ingestion = Arc::new(IngestionOrchestrator::new(
        repository.clone(),
        create_extractor(config),
        sniffer,
    ));
    let admission = Arc::new(AdmissionController::new(config.admission.policy()));

    if config.auth.api_keys.is_empty() && config.auth.admin_key.is_none() {
        tracing::warn!("No API keys configured; every claim request will be rejected");
    }

    info!(
        upload_dir = %config.upload.dir.display(),
        requests_per_window = config.admission.requests_per_window,
        window_secs = config.admission.window_secs,
        "Application state initialized"
    );

    Ok(AppState::new(
        claims,
        ingestion,
        admission,
        repository,
        config.auth.clone(),
    ))
}

/// Validator over the configured upload directory and size limits
pub fn create_validator(config: &AppConfig, sniffer: Arc<dyn ContentSniffer>) -> DocumentValidator {
    DocumentValidator::new(sniffer, config.upload.limits.clone(), &config.upload.dir)
}

/// Tesseract for images, pdftoppm + Tesseract for PDFs
pub fn create_extractor(config: &AppConfig) -> Arc<dyn TextExtractor> {
    Arc::new(OcrTextExtractor::new(
        Arc::new(TesseractEngine::from_config(&config.ocr)),
        Arc::new(PdftoppmRasterizer::from_config(&config.ocr)),
    ))
}

async fn create_repository(config: &AppConfig) -> anyhow::Result<Arc<dyn ClaimRepository>> {
    match config.storage.backend {
        StorageBackend::InMemory => {
            info!("Using in-memory claim storage");
            Ok(Arc::new(InMemoryClaimRepository::new()))
        }
        StorageBackend::Postgres => {
            let url = config
                .storage
                .database_url
                .as_deref()
                .context("storage.database_url is required for the postgres backend")?;

            let repository = PostgresClaimRepository::connect(&PostgresConfig::new(url)).await?;
            info!("Using PostgreSQL claim storage");
            Ok(Arc::new(repository))
        }
    }
}
