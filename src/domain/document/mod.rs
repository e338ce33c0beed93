//! Uploaded document domain types
//!
//! This module provides:
//! - `ContentType` / `DocumentKind`, the sniffed classification of uploaded bytes
//! - `ContentSniffer`, the capability that classifies bytes independent of filename
//! - `SizeLimits` and the admission policy applied to uploads

pub mod content_type;
pub mod sniffer;
pub mod validation;

pub use content_type::{ContentType, DocumentKind, ALLOWED_MIME_TYPES};
pub use sniffer::{ContentSniffer, SNIFF_LEN};
pub use validation::{
    check_document, declared_mime, sanitize_filename, SizeLimits, ValidationError,
};
