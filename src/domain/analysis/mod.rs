//! Claim analysis domain types
//!
//! This module provides:
//! - `FieldParser`, best-effort extraction of claim fields from a transcript
//! - `ClaimAnalysisResult` and `PipelineError`, the outcome of an ingestion run

pub mod fields;
pub mod result;

pub use fields::{FieldParser, ParsedFields};
pub use result::{ClaimAnalysisResult, PipelineError};
