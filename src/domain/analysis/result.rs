//! Outcome types of a claim document analysis

use serde::Serialize;
use thiserror::Error;

use super::ParsedFields;
use crate::domain::claim::ClaimId;
use crate::domain::DomainError;

/// Failure of an ingestion run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("No claim found with ID {0}")]
    ClaimNotFound(ClaimId),

    #[error("Claim {0} has no readable document on file")]
    DocumentMissing(ClaimId),

    #[error("OCR processing failed: {detail}")]
    ExtractionFailed { detail: String },

    #[error(transparent)]
    Storage(#[from] DomainError),
}

impl PipelineError {
    pub fn extraction(detail: impl Into<String>) -> Self {
        Self::ExtractionFailed {
            detail: detail.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::ClaimNotFound(_) => "CLAIM_NOT_FOUND",
            Self::DocumentMissing(_) => "FILE_NOT_FOUND",
            Self::ExtractionFailed { .. } => "OCR_FAILED",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }
}

/// Result reported after a successful ingestion run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClaimAnalysisResult {
    pub claim_id: ClaimId,
    pub source_file: String,
    pub extracted_text: String,
    #[serde(skip_serializing_if = "ParsedFields::is_empty")]
    pub updated_fields: ParsedFields,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            PipelineError::ClaimNotFound(ClaimId::new(1)).code(),
            "CLAIM_NOT_FOUND"
        );
        assert_eq!(
            PipelineError::DocumentMissing(ClaimId::new(1)).code(),
            "FILE_NOT_FOUND"
        );
        assert_eq!(PipelineError::extraction("boom").code(), "OCR_FAILED");
        assert_eq!(
            PipelineError::from(DomainError::storage("down")).code(),
            "STORAGE_ERROR"
        );
    }

    #[test]
    fn test_not_found_message() {
        let err = PipelineError::ClaimNotFound(ClaimId::new(42));
        assert_eq!(err.to_string(), "No claim found with ID 42");
    }

    #[test]
    fn test_result_omits_empty_fields() {
        let result = ClaimAnalysisResult {
            claim_id: ClaimId::new(3),
            source_file: "scan.png".to_string(),
            extracted_text: "hello".to_string(),
            updated_fields: ParsedFields::default(),
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["claim_id"], 3);
        assert!(json.get("updated_fields").is_none());
    }
}
