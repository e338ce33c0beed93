//! Application state for shared services

use std::sync::Arc;

use crate::config::AuthConfig;
use crate::domain::claim::ClaimRepository;
use crate::infrastructure::admission::AdmissionController;
use crate::infrastructure::services::{ClaimService, IngestionOrchestratorTrait};

/// Application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub claims: Arc<ClaimService>,
    pub ingestion: Arc<dyn IngestionOrchestratorTrait>,
    pub admission: Arc<AdmissionController>,
    pub repository: Arc<dyn ClaimRepository>,
    pub auth: Arc<AuthConfig>,
}

impl AppState {
    pub fn new(
        claims: Arc<ClaimService>,
        ingestion: Arc<dyn IngestionOrchestratorTrait>,
        admission: Arc<AdmissionController>,
        repository: Arc<dyn ClaimRepository>,
        auth: AuthConfig,
    ) -> Self {
        Self {
            claims,
            ingestion,
            admission,
            repository,
            auth: Arc::new(auth),
        }
    }
}
