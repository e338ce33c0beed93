//! Claim document ingestion pipeline

use std::collections::HashMap;
use std::fmt::Debug;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use tokio::io::AsyncReadExt;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, error, info};

use super::commit::RawTextCommit;
use crate::domain::analysis::{ClaimAnalysisResult, FieldParser, PipelineError};
use crate::domain::claim::{Claim, ClaimId, ClaimRepository};
use crate::domain::document::{ContentSniffer, ContentType, SNIFF_LEN};
use crate::domain::extraction::TextExtractor;

/// Runs extraction and field parsing for a claim's document
#[cfg_attr(test, automock)]
#[async_trait]
pub trait IngestionOrchestratorTrait: Send + Sync + Debug {
    /// Analyze the document recorded on the claim
    async fn ingest(&self, claim_id: ClaimId) -> Result<ClaimAnalysisResult, PipelineError>;

    /// Analyze a specific document on behalf of the claim
    async fn ingest_document(
        &self,
        claim_id: ClaimId,
        document: &Path,
    ) -> Result<ClaimAnalysisResult, PipelineError>;
}

/// Extract, commit raw text, parse, conditionally commit fields.
///
/// Runs for the same claim are serialized across both commit phases.
#[derive(Debug)]
pub struct IngestionOrchestrator {
    repository: Arc<dyn ClaimRepository>,
    extractor: Arc<dyn TextExtractor>,
    sniffer: Arc<dyn ContentSniffer>,
    parser: FieldParser,
    claim_locks: Mutex<HashMap<ClaimId, Arc<Mutex<()>>>>,
}

impl IngestionOrchestrator {
    pub fn new(
        repository: Arc<dyn ClaimRepository>,
        extractor: Arc<dyn TextExtractor>,
        sniffer: Arc<dyn ContentSniffer>,
    ) -> Self {
        Self {
            repository,
            extractor,
            sniffer,
            parser: FieldParser::new(),
            claim_locks: Mutex::new(HashMap::new()),
        }
    }

    async fn lock_claim(&self, claim_id: ClaimId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.claim_locks.lock().await;
            // Drop locks nobody is holding or waiting on
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(claim_id).or_default().clone()
        };

        lock.lock_owned().await
    }

    async fn resolve(&self, claim_id: ClaimId) -> Result<Claim, PipelineError> {
        self.repository
            .get(claim_id)
            .await?
            .ok_or(PipelineError::ClaimNotFound(claim_id))
    }

    /// The recorded sniffed type when `document` is the claim's own upload,
    /// otherwise a fresh sniff of the document's bytes
    async fn content_type(&self, claim: &Claim, document: &Path) -> Result<ContentType, PipelineError> {
        let is_own_upload = claim
            .document_path
            .as_deref()
            .is_some_and(|stored| Path::new(stored) == document);

        if is_own_upload {
            if let Some(recorded) = claim.file_type.as_deref().map(ContentType::from_mime) {
                if recorded.is_supported() {
                    return Ok(recorded);
                }
            }
        }

        let mut head = Vec::with_capacity(SNIFF_LEN);
        let file = tokio::fs::File::open(document)
            .await
            .map_err(|_| PipelineError::DocumentMissing(claim.id))?;
        file.take(SNIFF_LEN as u64)
            .read_to_end(&mut head)
            .await
            .map_err(|e| PipelineError::extraction(format!("cannot read document: {}", e)))?;

        let sniffed = self.sniffer.sniff(&head);
        debug!(claim_id = %claim.id, mime = %sniffed, "Re-sniffed stored document");
        Ok(sniffed)
    }

    async fn run(&self, claim: &Claim, document: &Path) -> Result<ClaimAnalysisResult, PipelineError> {
        let exists = tokio::fs::try_exists(document).await.unwrap_or(false);
        if !exists {
            return Err(PipelineError::DocumentMissing(claim.id));
        }

        let content_type = self.content_type(claim, document).await?;

        let text = self
            .extractor
            .extract(document, &content_type)
            .await
            .map_err(|e| {
                error!(
                    claim_id = %claim.id,
                    path = %document.display(),
                    error = %e,
                    "OCR processing failed"
                );
                PipelineError::extraction(e.to_string())
            })?;

        let raw = RawTextCommit::commit(self.repository.as_ref(), claim.id, text).await?;
        info!(claim_id = %claim.id, chars = raw.text().len(), "OCR text saved");

        let committed = raw.parse(&self.parser).commit(self.repository.as_ref()).await?;
        if committed.updated_fields.is_empty() {
            info!(claim_id = %claim.id, "No claim fields found in OCR text");
        } else {
            info!(
                claim_id = %claim.id,
                claim_type = ?committed.updated_fields.claim_type,
                amount = ?committed.updated_fields.amount,
                "Claim fields updated from OCR text"
            );
        }

        Ok(ClaimAnalysisResult {
            claim_id: claim.id,
            source_file: document.display().to_string(),
            extracted_text: committed.text,
            updated_fields: committed.updated_fields,
        })
    }
}

#[async_trait]
impl IngestionOrchestratorTrait for IngestionOrchestrator {
    async fn ingest(&self, claim_id: ClaimId) -> Result<ClaimAnalysisResult, PipelineError> {
        let _guard = self.lock_claim(claim_id).await;

        let claim = self.resolve(claim_id).await?;
        let Some(document) = claim.document_path.clone() else {
            return Err(PipelineError::DocumentMissing(claim_id));
        };

        self.run(&claim, Path::new(&document)).await
    }

    async fn ingest_document(
        &self,
        claim_id: ClaimId,
        document: &Path,
    ) -> Result<ClaimAnalysisResult, PipelineError> {
        let _guard = self.lock_claim(claim_id).await;

        let claim = self.resolve(claim_id).await?;
        self.run(&claim, document).await
    }
}
