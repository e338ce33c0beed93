//! Magic-byte content sniffer

use crate::domain::document::{ContentSniffer, ContentType};

/// Signatures checked in order; first prefix match wins
const SIGNATURES: &[(&[u8], &str)] = &[
    (b"\x89PNG\r\n\x1a\n", "image/png"),
    (b"\xff\xd8\xff", "image/jpeg"),
    (b"%PDF-", "application/pdf"),
    (b"GIF87a", "image/gif"),
    (b"GIF89a", "image/gif"),
    (b"II*\x00", "image/tiff"),
    (b"MM\x00*", "image/tiff"),
    (b"PK\x03\x04", "application/zip"),
    (b"\x1f\x8b", "application/gzip"),
    (b"\x7fELF", "application/x-executable"),
    (b"\xd0\xcf\x11\xe0\xa1\xb1\x1a\xe1", "application/x-ole-storage"),
];

/// Classifies content from its leading bytes, ignoring any declared name
#[derive(Debug, Clone, Copy, Default)]
pub struct MagicByteSniffer;

impl MagicByteSniffer {
    pub fn new() -> Self {
        Self
    }
}

impl ContentSniffer for MagicByteSniffer {
    fn sniff(&self, head: &[u8]) -> ContentType {
        if head.is_empty() {
            return ContentType::Other("application/x-empty".to_string());
        }

        if let Some((_, mime)) = SIGNATURES.iter().find(|(magic, _)| head.starts_with(magic)) {
            return ContentType::from_mime(mime);
        }

        if is_riff_webp(head) {
            return ContentType::Other("image/webp".to_string());
        }

        if looks_like_text(head) {
            ContentType::PlainText
        } else {
            ContentType::Other("application/octet-stream".to_string())
        }
    }
}

fn is_riff_webp(head: &[u8]) -> bool {
    head.len() >= 12 && head.starts_with(b"RIFF") && &head[8..12] == b"WEBP"
}

/// UTF-8 without binary control bytes; a sequence cut off at the end of the
/// sniffed prefix still counts as text
fn looks_like_text(head: &[u8]) -> bool {
    let valid = match std::str::from_utf8(head) {
        Ok(_) => true,
        Err(e) => e.error_len().is_none(),
    };

    valid && !head.iter().any(|&b| is_binary_control(b))
}

fn is_binary_control(byte: u8) -> bool {
    matches!(byte, 0x00..=0x08 | 0x0e..=0x1a | 0x1c..=0x1f | 0x7f)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sniff(bytes: &[u8]) -> ContentType {
        MagicByteSniffer::new().sniff(bytes)
    }

    #[test]
    fn test_sniffs_supported_signatures() {
        assert_eq!(sniff(b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR"), ContentType::Png);
        assert_eq!(sniff(b"\xff\xd8\xff\xe0\0\x10JFIF"), ContentType::Jpeg);
        assert_eq!(sniff(b"%PDF-1.7\n%\xe2\xe3\xcf\xd3"), ContentType::Pdf);
    }

    #[test]
    fn test_sniffs_plain_text() {
        assert_eq!(
            sniff(b"Claim Type: Travel\r\nAmount: $120.00\n\tnotes"),
            ContentType::PlainText
        );
        assert_eq!(sniff("Montant réclamé: 12,00 €".as_bytes()), ContentType::PlainText);
    }

    #[test]
    fn test_truncated_utf8_tail_is_still_text() {
        let text = "prix €".as_bytes();
        assert_eq!(sniff(&text[..text.len() - 1]), ContentType::PlainText);
    }

    #[test]
    fn test_unsupported_binaries() {
        assert_eq!(
            sniff(b"PK\x03\x04\x14\0\0\0"),
            ContentType::Other("application/zip".to_string())
        );
        assert_eq!(
            sniff(b"GIF89a\x01\0\x01\0"),
            ContentType::Other("image/gif".to_string())
        );
        assert_eq!(
            sniff(b"RIFF\x24\0\0\0WEBPVP8 "),
            ContentType::Other("image/webp".to_string())
        );
        assert_eq!(
            sniff(&[0x00, 0x01, 0x02, 0xfe, 0xff]),
            ContentType::Other("application/octet-stream".to_string())
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(!sniff(b"").is_supported());
    }
}
