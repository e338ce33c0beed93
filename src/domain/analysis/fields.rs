//! Structured field extraction from OCR text

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// `Claim Type: <word>` with arbitrary whitespace around the label parts
static CLAIM_TYPE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Claim\s*Type\s*:\s*(\w+)").unwrap());

/// `Amount: $1,234.56`, the dollar sign and grouping commas optional
static AMOUNT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Amount\s*:\s*\$?([0-9,]+\.[0-9]{2})").unwrap());

/// Fields derived from a transcript; absence is a normal outcome
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedFields {
    pub claim_type: Option<String>,
    pub amount: Option<f64>,
}

impl ParsedFields {
    /// True when neither field was found
    pub fn is_empty(&self) -> bool {
        self.claim_type.is_none() && self.amount.is_none()
    }
}

/// Pattern-based claim field parser
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldParser;

impl FieldParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse claim fields; first match wins, never fails
    pub fn parse(&self, text: &str) -> ParsedFields {
        let claim_type = CLAIM_TYPE_PATTERN
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string());

        let amount = AMOUNT_PATTERN
            .captures(text)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().replace(',', "").parse::<f64>().ok());

        ParsedFields { claim_type, amount }
    }
}
