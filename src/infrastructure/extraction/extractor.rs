//! Kind-dispatching text extractor

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{error, info};

use crate::domain::document::{ContentType, DocumentKind};
use crate::domain::extraction::{
    ExtractedText, ExtractionError, OcrEngine, PageRasterizer, TextExtractor,
};
use crate::infrastructure::observability::record_extraction;

/// Extracts text by OCR for images and PDFs and by direct read for plain text
#[derive(Debug, Clone)]
pub struct OcrTextExtractor {
    ocr: Arc<dyn OcrEngine>,
    rasterizer: Arc<dyn PageRasterizer>,
}

impl OcrTextExtractor {
    pub fn new(ocr: Arc<dyn OcrEngine>, rasterizer: Arc<dyn PageRasterizer>) -> Self {
        Self { ocr, rasterizer }
    }

    async fn extract_image(&self, path: &Path) -> Result<ExtractedText, ExtractionError> {
        self.ocr.recognize(path).await.map(ExtractedText::new)
    }

    /// Rasterize into a scratch directory and OCR page by page.
    /// The first failing page aborts the whole document.
    async fn extract_pdf(&self, path: &Path) -> Result<ExtractedText, ExtractionError> {
        let scratch = tempfile::tempdir()
            .map_err(|e| ExtractionError::engine(format!("cannot create page directory: {}", e)))?;

        let pages = self.rasterizer.rasterize(path, scratch.path()).await?;

        let mut texts = Vec::with_capacity(pages.len());
        for page in &pages {
            texts.push(self.ocr.recognize(page).await?);
        }

        Ok(ExtractedText::from_pages(texts))
    }

    async fn extract_plain_text(&self, path: &Path) -> Result<ExtractedText, ExtractionError> {
        tokio::fs::read_to_string(path)
            .await
            .map(ExtractedText::new)
            .map_err(|e| ExtractionError::engine(format!("cannot read text document: {}", e)))
    }
}

#[async_trait]
impl TextExtractor for OcrTextExtractor {
    async fn extract(
        &self,
        path: &Path,
        content_type: &ContentType,
    ) -> Result<ExtractedText, ExtractionError> {
        let Some(kind) = content_type.kind() else {
            return Err(ExtractionError::UnsupportedKind(content_type.mime().to_string()));
        };

        let started = Instant::now();
        let result = match kind {
            DocumentKind::Image => self.extract_image(path).await,
            DocumentKind::Pdf => self.extract_pdf(path).await,
            DocumentKind::PlainText => self.extract_plain_text(path).await,
        };

        record_extraction(&kind.to_string(), result.is_ok(), started.elapsed());

        match &result {
            Ok(text) => info!(
                path = %path.display(),
                kind = %kind,
                chars = text.as_str().len(),
                "Text extracted"
            ),
            Err(e) => error!(path = %path.display(), kind = %kind, error = %e, "Extraction failed"),
        }

        result
    }
}
