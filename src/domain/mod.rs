//! Domain layer - Core business logic and entities

pub mod admission;
pub mod analysis;
pub mod claim;
pub mod document;
pub mod error;
pub mod extraction;

pub use admission::{AdmissionDecision, AdmissionPolicy, BlockEvent, DenialReason, Identity};
pub use analysis::{ClaimAnalysisResult, FieldParser, ParsedFields, PipelineError};
pub use claim::{
    Claim, ClaimFilter, ClaimId, ClaimRepository, ClaimStatus, NewClaim, StoredDocument,
};
pub use document::{
    check_document, declared_mime, sanitize_filename, ContentSniffer, ContentType, DocumentKind,
    SizeLimits, ValidationError, ALLOWED_MIME_TYPES, SNIFF_LEN,
};
pub use error::DomainError;
pub use extraction::{
    ExtractedText, ExtractionError, OcrEngine, PageRasterizer, TextExtractor,
};
