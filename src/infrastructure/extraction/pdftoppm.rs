//! PDF page rasterizer backed by poppler's `pdftoppm`

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::command::run_tool;
use crate::config::OcrConfig;
use crate::domain::extraction::{ExtractionError, PageRasterizer};

const PAGE_PREFIX: &str = "page";

/// Renders each PDF page to `<out_dir>/page-<n>.png`
#[derive(Debug, Clone)]
pub struct PdftoppmRasterizer {
    command: String,
    dpi: u32,
    timeout: Duration,
}

impl PdftoppmRasterizer {
    pub fn new(command: impl Into<String>, dpi: u32, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            dpi,
            timeout,
        }
    }

    pub fn from_config(config: &OcrConfig) -> Self {
        Self::new(
            &config.pdftoppm_cmd,
            config.dpi,
            Duration::from_secs(config.timeout_secs),
        )
    }
}

#[async_trait]
impl PageRasterizer for PdftoppmRasterizer {
    async fn rasterize(&self, pdf: &Path, out_dir: &Path) -> Result<Vec<PathBuf>, ExtractionError> {
        let dpi = self.dpi.to_string();
        let prefix = out_dir.join(PAGE_PREFIX);

        run_tool(
            &self.command,
            [
                OsStr::new("-r"),
                OsStr::new(&dpi),
                OsStr::new("-png"),
                pdf.as_os_str(),
                prefix.as_os_str(),
            ],
            self.timeout,
        )
        .await?;

        let pages = collect_pages(out_dir).await?;
        debug!(pdf = %pdf.display(), pages = pages.len(), "Rasterized PDF");

        Ok(pages)
    }
}

/// Rendered page images sorted by page number.
///
/// pdftoppm zero-pads the number to the width of the page count, so the
/// number is parsed rather than relying on lexical order.
async fn collect_pages(out_dir: &Path) -> Result<Vec<PathBuf>, ExtractionError> {
    let mut entries = tokio::fs::read_dir(out_dir)
        .await
        .map_err(|e| ExtractionError::engine(format!("cannot list rendered pages: {}", e)))?;

    let mut pages = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| ExtractionError::engine(format!("cannot list rendered pages: {}", e)))?
    {
        let path = entry.path();
        if let Some(number) = page_number(&path) {
            pages.push((number, path));
        }
    }

    pages.sort_by_key(|(number, _)| *number);
    Ok(pages.into_iter().map(|(_, path)| path).collect())
}

fn page_number(path: &Path) -> Option<u32> {
    if path.extension()? != "png" {
        return None;
    }

    let stem = path.file_stem()?.to_str()?;
    let (prefix, number) = stem.rsplit_once('-')?;
    if prefix != PAGE_PREFIX {
        return None;
    }

    number.parse().ok()
}
