//! Text extraction infrastructure
//!
//! `OcrTextExtractor` dispatches on document kind and drives two external
//! tools: `tesseract` for OCR and `pdftoppm` (poppler) for PDF rasterizing.

mod command;
mod extractor;
mod pdftoppm;
mod tesseract;

pub use extractor::OcrTextExtractor;
pub use pdftoppm::PdftoppmRasterizer;
pub use tesseract::TesseractEngine;
