//! Upload admission policy: allow-list and per-type size ceilings

use serde::Deserialize;
use thiserror::Error;

use super::content_type::{ContentType, ALLOWED_MIME_TYPES};

const MIB: u64 = 1024 * 1024;

/// Per-type byte ceilings for uploaded documents
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SizeLimits {
    #[serde(default = "default_image_limit")]
    pub png_bytes: u64,
    #[serde(default = "default_image_limit")]
    pub jpeg_bytes: u64,
    #[serde(default = "default_pdf_limit")]
    pub pdf_bytes: u64,
    #[serde(default = "default_text_limit")]
    pub text_bytes: u64,
}

fn default_image_limit() -> u64 {
    15 * MIB
}

fn default_pdf_limit() -> u64 {
    20 * MIB
}

fn default_text_limit() -> u64 {
    5 * MIB
}

impl Default for SizeLimits {
    fn default() -> Self {
        Self {
            png_bytes: default_image_limit(),
            jpeg_bytes: default_image_limit(),
            pdf_bytes: default_pdf_limit(),
            text_bytes: default_text_limit(),
        }
    }
}

impl SizeLimits {
    /// Ceiling for a content type, `None` for types outside the allow-list
    pub fn limit_for(&self, content_type: &ContentType) -> Option<u64> {
        match content_type {
            ContentType::Png => Some(self.png_bytes),
            ContentType::Jpeg => Some(self.jpeg_bytes),
            ContentType::Pdf => Some(self.pdf_bytes),
            ContentType::PlainText => Some(self.text_bytes),
            ContentType::Other(_) => None,
        }
    }
}

/// Rejection of an uploaded document
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("File type '{mime}' is not allowed. Allowed types: {allowed:?}")]
    UnsupportedType {
        mime: String,
        allowed: Vec<&'static str>,
    },

    #[error("File exceeds limit. Max allowed: {:.1}MB", *limit as f64 / MIB as f64)]
    FileTooLarge { size: u64, limit: u64 },

    #[error("File upload failed: {0}")]
    Io(#[from] std::io::Error),
}

impl ValidationError {
    pub fn unsupported(mime: impl Into<String>) -> Self {
        Self::UnsupportedType {
            mime: mime.into(),
            allowed: ALLOWED_MIME_TYPES.to_vec(),
        }
    }

    /// Stable machine-readable code reported at the boundary
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedType { .. } => "INVALID_FILE_TYPE",
            Self::FileTooLarge { .. } => "FILE_TOO_LARGE",
            Self::Io(_) => "UPLOAD_FAILED",
        }
    }
}

/// Apply the allow-list and the size ceiling to a sniffed document
pub fn check_document(
    content_type: ContentType,
    size: u64,
    limits: &SizeLimits,
) -> Result<ContentType, ValidationError> {
    let limit = limits
        .limit_for(&content_type)
        .ok_or_else(|| ValidationError::unsupported(content_type.mime()))?;

    if size > limit {
        return Err(ValidationError::FileTooLarge { size, limit });
    }

    Ok(content_type)
}

/// Reduce a client-declared filename to a safe final path component
pub fn sanitize_filename(declared: &str) -> String {
    let name = declared
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    let cleaned: String = name
        .chars()
        .map(|c| if c.is_control() { '_' } else { c })
        .collect();

    match cleaned.as_str() {
        "" | "." | ".." => format!("upload-{}", uuid::Uuid::new_v4()),
        _ => cleaned,
    }
}

/// MIME type a filename's extension claims to be; informational only
pub fn declared_mime(filename: &str) -> Option<String> {
    mime_guess::from_path(filename)
        .first()
        .map(|m| m.essence_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = SizeLimits::default();
        assert_eq!(limits.limit_for(&ContentType::Png), Some(15 * MIB));
        assert_eq!(limits.limit_for(&ContentType::Jpeg), Some(15 * MIB));
        assert_eq!(limits.limit_for(&ContentType::Pdf), Some(20 * MIB));
        assert_eq!(limits.limit_for(&ContentType::PlainText), Some(5 * MIB));
        assert_eq!(limits.limit_for(&ContentType::Other("a/b".into())), None);
    }

    #[test]
    fn test_check_accepts_within_limit() {
        let limits = SizeLimits::default();
        let accepted = check_document(ContentType::Pdf, 20 * MIB, &limits).unwrap();
        assert_eq!(accepted, ContentType::Pdf);
    }

    #[test]
    fn test_check_rejects_unknown_type() {
        let err = check_document(
            ContentType::Other("application/zip".into()),
            10,
            &SizeLimits::default(),
        )
        .unwrap_err();

        assert_eq!(err.code(), "INVALID_FILE_TYPE");
        assert!(err.to_string().contains("application/zip"));
    }

    #[test]
    fn test_check_rejects_oversized_and_reports_limit() {
        let err = check_document(ContentType::PlainText, 5 * MIB + 1, &SizeLimits::default())
            .unwrap_err();

        assert_eq!(err.code(), "FILE_TOO_LARGE");
        assert!(matches!(err, ValidationError::FileTooLarge { limit, .. } if limit == 5 * MIB));
        assert_eq!(err.to_string(), "File exceeds limit. Max allowed: 5.0MB");
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("receipt.png"), "receipt.png");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\docs\\scan.pdf"), "scan.pdf");
        assert!(sanitize_filename("..").starts_with("upload-"));
        assert!(sanitize_filename("").starts_with("upload-"));
    }

    #[test]
    fn test_declared_mime() {
        assert_eq!(declared_mime("scan.pdf").as_deref(), Some("application/pdf"));
        assert_eq!(declared_mime("notes.txt").as_deref(), Some("text/plain"));
        assert_eq!(declared_mime("noextension"), None);
    }
}
