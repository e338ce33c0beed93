//! Content sniffing capability

use std::fmt::Debug;

use super::ContentType;

/// Number of leading bytes a sniffer needs to classify a document
pub const SNIFF_LEN: usize = 8192;

/// Classifies raw bytes into a content type.
///
/// Implementations look only at the bytes; a claimed filename extension or a
/// client-supplied content-type header never influences the result.
pub trait ContentSniffer: Send + Sync + Debug {
    /// Classify the leading bytes of a document (at most `SNIFF_LEN` are needed)
    fn sniff(&self, head: &[u8]) -> ContentType;
}
