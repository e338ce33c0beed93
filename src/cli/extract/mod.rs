//! Extract command - one-off analysis of a local document

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use serde::Serialize;

use crate::config::AppConfig;
use crate::domain::analysis::{FieldParser, ParsedFields};
use crate::domain::extraction::TextExtractor;
use crate::infrastructure::document::{DocumentValidator, MagicByteSniffer};

#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// Document to analyze (PNG, JPEG, PDF or plain text)
    pub path: PathBuf,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Debug, Serialize)]
pub struct ExtractReport {
    pub file: String,
    pub content_type: String,
    pub extracted_text: String,
    pub fields: ParsedFields,
}

pub async fn run(config: AppConfig, args: ExtractArgs) -> anyhow::Result<()> {
    let validator = crate::create_validator(&config, Arc::new(MagicByteSniffer::new()));
    let extractor = crate::create_extractor(&config);

    let report = analyze(&validator, extractor.as_ref(), &args.path).await?;

    let output = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{}", output);

    Ok(())
}

/// Validate, extract and parse without touching storage or admission
pub async fn analyze(
    validator: &DocumentValidator,
    extractor: &dyn TextExtractor,
    path: &Path,
) -> anyhow::Result<ExtractReport> {
    let content_type = validator
        .validate_path(path)
        .await
        .with_context(|| format!("{} was rejected", path.display()))?;

    let text = extractor
        .extract(path, &content_type)
        .await
        .with_context(|| format!("extracting text from {}", path.display()))?;

    let fields = FieldParser::new().parse(text.as_str());

    Ok(ExtractReport {
        file: path.display().to_string(),
        content_type: content_type.mime().to_string(),
        extracted_text: text.into_string(),
        fields,
    })
}
