//! Tesseract OCR engine

use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::command::run_tool;
use crate::config::OcrConfig;
use crate::domain::extraction::{ExtractionError, OcrEngine};

/// Runs the `tesseract` CLI against an image and reads text from stdout
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    command: String,
    language: String,
    timeout: Duration,
}

impl TesseractEngine {
    pub fn new(command: impl Into<String>, language: impl Into<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            language: language.into(),
            timeout,
        }
    }

    pub fn from_config(config: &OcrConfig) -> Self {
        Self::new(
            &config.tesseract_cmd,
            &config.language,
            Duration::from_secs(config.timeout_secs),
        )
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    async fn recognize(&self, image: &Path) -> Result<String, ExtractionError> {
        debug!(image = %image.display(), "Running tesseract");

        let args = [
            image.as_os_str(),
            OsStr::new("stdout"),
            OsStr::new("-l"),
            OsStr::new(&self.language),
        ];
        let output = run_tool(&self.command, args, self.timeout).await?;

        Ok(clean_output(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Tesseract ends every page with a form feed
/// Drop the `\n\x0c` page terminator; the page's own trailing lines are kept
fn clean_output(raw: &str) -> String {
    match raw.strip_suffix('\u{c}') {
        Some(page) => page.strip_suffix('\n').unwrap_or(page).to_string(),
        None => raw.to_string(),
    }
}
