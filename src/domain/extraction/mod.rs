//! Text extraction domain types and traits
//!
//! This module provides:
//! - `TextExtractor`, polymorphic over document kind
//! - `OcrEngine` and `PageRasterizer`, the external engines extraction drives
//! - `ExtractedText` and `ExtractionError`

use std::fmt::Debug;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::document::ContentType;

/// Extraction failure; no partial text survives either variant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("Unsupported document kind: {0}")]
    UnsupportedKind(String),

    #[error("OCR engine failure: {detail}")]
    EngineFailure { detail: String },
}

impl ExtractionError {
    pub fn engine(detail: impl Into<String>) -> Self {
        Self::EngineFailure {
            detail: detail.into(),
        }
    }
}

/// Full transcript of a document, produced all-or-nothing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText(String);

impl ExtractedText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Join per-page output in page order, one newline between pages
    pub fn from_pages<I, S>(pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = pages
            .into_iter()
            .map(|p| p.as_ref().to_string())
            .collect::<Vec<_>>()
            .join("\n");

        Self(joined)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Optical character recognition over a single image file
#[async_trait]
pub trait OcrEngine: Send + Sync + Debug {
    async fn recognize(&self, image: &Path) -> Result<String, ExtractionError>;
}

/// Renders each page of a PDF into an image file
#[async_trait]
pub trait PageRasterizer: Send + Sync + Debug {
    /// Write one image per page into `out_dir`, returned in page order
    async fn rasterize(&self, pdf: &Path, out_dir: &Path) -> Result<Vec<PathBuf>, ExtractionError>;
}

/// Produces the text of a validated document
#[async_trait]
pub trait TextExtractor: Send + Sync + Debug {
    /// Extract text, choosing the strategy from the sniffed content type
    async fn extract(
        &self,
        path: &Path,
        content_type: &ContentType,
    ) -> Result<ExtractedText, ExtractionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pages_joins_with_single_newline() {
        let text = ExtractedText::from_pages(["A", "B", "C"]);
        assert_eq!(text.as_str(), "A\nB\nC");
    }

    #[test]
    fn test_from_single_page_has_no_separator() {
        let text = ExtractedText::from_pages(vec!["only".to_string()]);
        assert_eq!(text.into_string(), "only");
    }

    #[test]
    fn test_engine_error_display() {
        let err = ExtractionError::engine("tesseract exited with status 1");
        assert_eq!(
            err.to_string(),
            "OCR engine failure: tesseract exited with status 1"
        );
    }
}
