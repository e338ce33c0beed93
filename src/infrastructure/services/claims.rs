//! Claim management service

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::claim::{
    Claim, ClaimFilter, ClaimId, ClaimRepository, ClaimStatus, NewClaim, StoredDocument,
};
use crate::domain::document::ValidationError;
use crate::domain::DomainError;
use crate::infrastructure::document::DocumentValidator;

/// Maximum number of claims returned by a text search
pub const SEARCH_LIMIT: usize = 20;

/// Claim attributes supplied by the claimant
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimDetails {
    pub claimant_name: String,
    pub claim_type: String,
    pub amount: f64,
    pub description: Option<String>,
}

impl ClaimDetails {
    fn into_new_claim(self, document: Option<StoredDocument>) -> NewClaim {
        NewClaim {
            claimant_name: self.claimant_name,
            claim_type: self.claim_type,
            amount: self.amount,
            description: self.description,
            document,
        }
    }
}

/// A claim's document as stored on disk
#[derive(Debug, Clone, PartialEq)]
pub struct StoredFile {
    pub path: PathBuf,
    pub file_name: String,
    pub mime: String,
}

/// Failure of the upload flow
#[derive(Debug, Error)]
pub enum UploadError {
    #[error(transparent)]
    Rejected(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] DomainError),
}

/// Creates, queries and removes claims and their documents
#[derive(Debug)]
pub struct ClaimService {
    repository: Arc<dyn ClaimRepository>,
    validator: DocumentValidator,
}

impl ClaimService {
    pub fn new(repository: Arc<dyn ClaimRepository>, validator: DocumentValidator) -> Self {
        Self {
            repository,
            validator,
        }
    }

    pub fn validator(&self) -> &DocumentValidator {
        &self.validator
    }

    /// Create a claim without a document
    pub async fn create(&self, details: ClaimDetails) -> Result<Claim, DomainError> {
        let claim = self.repository.create(details.into_new_claim(None)).await?;
        info!(claim_id = %claim.id, "Claim created");
        Ok(claim)
    }

    /// Validate and store an uploaded document, then create its claim
    pub async fn create_from_upload(
        &self,
        details: ClaimDetails,
        declared_filename: &str,
        bytes: Bytes,
    ) -> Result<Claim, UploadError> {
        let staged = self.validator.stage(bytes, declared_filename).await?;
        let document = staged.persist(self.validator.upload_dir())?;
        let stored_path = PathBuf::from(&document.path);

        match self.repository.create(details.into_new_claim(Some(document))).await {
            Ok(claim) => {
                info!(
                    claim_id = %claim.id,
                    file_name = ?claim.file_name,
                    mime = ?claim.file_type,
                    "Claim created from upload"
                );
                Ok(claim)
            }
            Err(e) => {
                remove_document(&stored_path).await;
                Err(e.into())
            }
        }
    }

    pub async fn get(&self, id: ClaimId) -> Result<Claim, DomainError> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("No claim found with ID {}", id)))
    }

    pub async fn list(&self, filter: ClaimFilter) -> Result<Vec<Claim>, DomainError> {
        self.repository.list(filter).await
    }

    /// Claims whose OCR text contains any whitespace-separated term of `query`
    pub async fn search(&self, query: &str) -> Result<Vec<Claim>, DomainError> {
        let terms: Vec<String> = query.split_whitespace().map(str::to_string).collect();
        if terms.is_empty() {
            return Err(DomainError::validation("Search query must not be empty"));
        }

        self.repository.search_ocr_text(terms, SEARCH_LIMIT).await
    }

    pub async fn update_status(
        &self,
        id: ClaimId,
        status: ClaimStatus,
    ) -> Result<Claim, DomainError> {
        let claim = self.repository.update_status(id, status).await?;
        info!(claim_id = %id, status = %status, "Claim status updated");
        Ok(claim)
    }

    /// Delete a claim and, best effort, its stored document
    pub async fn delete(&self, id: ClaimId) -> Result<(), DomainError> {
        let claim = self.get(id).await?;

        if !self.repository.delete(id).await? {
            return Err(DomainError::not_found(format!("No claim found with ID {}", id)));
        }

        if let Some(path) = claim.document_path {
            remove_document(Path::new(&path)).await;
        }

        info!(claim_id = %id, "Claim deleted");
        Ok(())
    }

    /// The claim's stored document, `None` if it has none or it is gone from disk
    pub async fn document(&self, id: ClaimId) -> Result<Option<StoredFile>, DomainError> {
        let claim = self.get(id).await?;

        let Some(path) = claim.document_path.map(PathBuf::from) else {
            return Ok(None);
        };

        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(None);
        }

        let file_name = claim.file_name.unwrap_or_else(|| {
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "document".to_string())
        });

        Ok(Some(StoredFile {
            path,
            file_name,
            mime: claim
                .file_type
                .unwrap_or_else(|| "application/octet-stream".to_string()),
        }))
    }
}

async fn remove_document(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => info!(path = %path.display(), "Document removed"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!(path = %path.display(), "Nothing to delete")
        }
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to delete document"),
    }
}
