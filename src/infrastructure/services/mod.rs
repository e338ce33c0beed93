//! Infrastructure services

mod claims;
pub mod commit;
mod ingestion;

pub use claims::{ClaimDetails, ClaimService, StoredFile, UploadError, SEARCH_LIMIT};
pub use commit::{CommittedAnalysis, PendingParse, RawTextCommit};
pub use ingestion::{IngestionOrchestrator, IngestionOrchestratorTrait};
#[cfg(test)]
pub use ingestion::MockIngestionOrchestratorTrait;
