//! Sniffed content classification

use std::fmt;

/// MIME types accepted for upload
pub const ALLOWED_MIME_TYPES: [&str; 4] = ["image/png", "image/jpeg", "application/pdf", "text/plain"];

/// Content type determined from the bytes of a document
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContentType {
    Png,
    Jpeg,
    Pdf,
    PlainText,
    /// Anything outside the allow-list, carrying the detected MIME type
    Other(String),
}

/// How text is obtained from a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// OCR runs directly against the decoded image
    Image,
    /// Each page is rasterized and OCR'd in page order
    Pdf,
    /// Decoded directly, OCR skipped
    PlainText,
}

impl ContentType {
    /// Parse a MIME type string, ignoring parameters such as `charset`
    pub fn from_mime(mime: &str) -> Self {
        let essence = mime
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();

        match essence.as_str() {
            "image/png" => Self::Png,
            "image/jpeg" | "image/jpg" => Self::Jpeg,
            "application/pdf" => Self::Pdf,
            "text/plain" => Self::PlainText,
            _ => Self::Other(essence),
        }
    }

    /// Canonical MIME type string
    pub fn mime(&self) -> &str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Pdf => "application/pdf",
            Self::PlainText => "text/plain",
            Self::Other(mime) => mime,
        }
    }

    /// Extraction strategy for this type, `None` when unsupported
    pub fn kind(&self) -> Option<DocumentKind> {
        match self {
            Self::Png | Self::Jpeg => Some(DocumentKind::Image),
            Self::Pdf => Some(DocumentKind::Pdf),
            Self::PlainText => Some(DocumentKind::PlainText),
            Self::Other(_) => None,
        }
    }

    pub fn is_supported(&self) -> bool {
        self.kind().is_some()
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image => write!(f, "image"),
            Self::Pdf => write!(f, "pdf"),
            Self::PlainText => write!(f, "text"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_mime() {
        assert_eq!(ContentType::from_mime("image/png"), ContentType::Png);
        assert_eq!(ContentType::from_mime("IMAGE/JPEG"), ContentType::Jpeg);
        assert_eq!(ContentType::from_mime("application/pdf"), ContentType::Pdf);
        assert_eq!(
            ContentType::from_mime("text/plain; charset=utf-8"),
            ContentType::PlainText
        );
        assert_eq!(
            ContentType::from_mime("application/zip"),
            ContentType::Other("application/zip".to_string())
        );
    }

    #[test]
    fn test_kind() {
        assert_eq!(ContentType::Png.kind(), Some(DocumentKind::Image));
        assert_eq!(ContentType::Jpeg.kind(), Some(DocumentKind::Image));
        assert_eq!(ContentType::Pdf.kind(), Some(DocumentKind::Pdf));
        assert_eq!(ContentType::PlainText.kind(), Some(DocumentKind::PlainText));
        assert_eq!(ContentType::Other("x/y".into()).kind(), None);
    }

    #[test]
    fn test_allow_list_matches_supported_types() {
        for mime in ALLOWED_MIME_TYPES {
            assert!(ContentType::from_mime(mime).is_supported(), "{mime}");
        }
    }
}
