//! Upload validation and staging
//!
//! Uploaded bytes are written to a temporary file inside the upload directory,
//! sniffed and size-checked from there, and only renamed into place once accepted.
//! A rejected upload's temporary file is removed before the error is returned.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use tempfile::NamedTempFile;
use tokio::io::AsyncReadExt;
use tracing::{debug, warn};

use crate::domain::claim::StoredDocument;
use crate::domain::document::{
    check_document, declared_mime, sanitize_filename, ContentSniffer, ContentType, SizeLimits,
    ValidationError, SNIFF_LEN,
};
use crate::infrastructure::observability::record_upload_rejected;

/// Applies the sniff + allow-list + size policy to uploaded documents
#[derive(Debug, Clone)]
pub struct DocumentValidator {
    sniffer: Arc<dyn ContentSniffer>,
    limits: SizeLimits,
    upload_dir: PathBuf,
}

/// An accepted upload still sitting in its temporary file
#[derive(Debug)]
pub struct StagedUpload {
    temp: NamedTempFile,
    file_name: String,
    content_type: ContentType,
    size: u64,
}

impl DocumentValidator {
    pub fn new(
        sniffer: Arc<dyn ContentSniffer>,
        limits: SizeLimits,
        upload_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            sniffer,
            limits,
            upload_dir: upload_dir.into(),
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn limits(&self) -> &SizeLimits {
        &self.limits
    }

    /// Validate in-memory bytes; returns the sniffed type on acceptance
    pub fn validate(
        &self,
        bytes: &[u8],
        declared_filename: &str,
    ) -> Result<ContentType, ValidationError> {
        let head = &bytes[..bytes.len().min(SNIFF_LEN)];
        self.decide(head, bytes.len() as u64, declared_filename)
    }

    /// Validate a file already on disk
    pub async fn validate_path(&self, path: &Path) -> Result<ContentType, ValidationError> {
        let size = tokio::fs::metadata(path).await?.len();
        let head = read_head(path).await?;
        let declared = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        self.decide(&head, size, &declared)
    }

    /// Write an upload to a temp file in the upload directory and validate it.
    ///
    /// On rejection the temp file is gone by the time the error is returned.
    pub async fn stage(
        &self,
        bytes: Bytes,
        declared_filename: &str,
    ) -> Result<StagedUpload, ValidationError> {
        let dir = self.upload_dir.clone();
        let temp = tokio::task::spawn_blocking(move || -> io::Result<NamedTempFile> {
            std::fs::create_dir_all(&dir)?;
            let mut temp = tempfile::Builder::new()
                .prefix(".staging-")
                .tempfile_in(&dir)?;
            temp.write_all(&bytes)?;
            temp.flush()?;
            Ok(temp)
        })
        .await
        .map_err(io::Error::other)??;

        let checked = self.check_staged(temp.path(), declared_filename).await;

        match checked {
            Ok((content_type, size)) => Ok(StagedUpload {
                temp,
                file_name: sanitize_filename(declared_filename),
                content_type,
                size,
            }),
            Err(e) => {
                let staged_path = temp.path().to_path_buf();
                if let Err(close_err) = temp.close() {
                    warn!(
                        path = %staged_path.display(),
                        error = %close_err,
                        "Failed to remove rejected upload"
                    );
                }
                Err(e)
            }
        }
    }

    async fn check_staged(
        &self,
        path: &Path,
        declared_filename: &str,
    ) -> Result<(ContentType, u64), ValidationError> {
        let size = tokio::fs::metadata(path).await?.len();
        let head = read_head(path).await?;
        let content_type = self.decide(&head, size, declared_filename)?;
        Ok((content_type, size))
    }

    fn decide(
        &self,
        head: &[u8],
        size: u64,
        declared_filename: &str,
    ) -> Result<ContentType, ValidationError> {
        let sniffed = self.sniffer.sniff(head);

        if let Some(declared) = declared_mime(declared_filename) {
            if sniffed.is_supported() && declared != sniffed.mime() {
                warn!(
                    file_name = %declared_filename,
                    declared = %declared,
                    sniffed = %sniffed,
                    "Declared extension does not match sniffed content"
                );
            }
        }

        match check_document(sniffed, size, &self.limits) {
            Ok(content_type) => {
                debug!(file_name = %declared_filename, mime = %content_type, size, "Upload accepted");
                Ok(content_type)
            }
            Err(e) => {
                warn!(file_name = %declared_filename, code = e.code(), "Upload rejected: {}", e);
                record_upload_rejected(e.code());
                Err(e)
            }
        }
    }
}

impl StagedUpload {
    pub fn content_type(&self) -> &ContentType {
        &self.content_type
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Move the upload to `<dir>/<uuid>-<file_name>`; never replaces an existing file.
    ///
    /// `file_name` keeps the declared name for downloads.
    pub fn persist(self, dir: &Path) -> Result<StoredDocument, ValidationError> {
        let target = dir.join(stored_name(&self.file_name));
        self.temp.persist_noclobber(&target).map_err(|e| e.error)?;

        Ok(StoredDocument {
            path: target.to_string_lossy().into_owned(),
            file_name: self.file_name,
            file_type: self.content_type.mime().to_string(),
            file_size: self.size,
        })
    }
}

fn stored_name(file_name: &str) -> String {
    format!("{}-{}", uuid::Uuid::new_v4(), file_name)
}

async fn read_head(path: &Path) -> io::Result<Vec<u8>> {
    let file = tokio::fs::File::open(path).await?;
    let mut head = Vec::with_capacity(SNIFF_LEN);
    file.take(SNIFF_LEN as u64).read_to_end(&mut head).await?;
    Ok(head)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::document::MagicByteSniffer;

    const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    fn validator(dir: &Path) -> DocumentValidator {
        DocumentValidator::new(Arc::new(MagicByteSniffer::new()), SizeLimits::default(), dir)
    }

    fn dir_entries(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default()
    }

    #[test]
    fn test_validate_ignores_declared_extension() {
        let dir = tempfile::tempdir().unwrap();
        let validator = validator(dir.path());

        let content_type = validator.validate(PNG_HEADER, "scan.txt").unwrap();
        assert_eq!(content_type, ContentType::Png);
    }

    #[test]
    fn test_validate_rejects_oversized_text() {
        let dir = tempfile::tempdir().unwrap();
        let limits = SizeLimits {
            text_bytes: 8,
            ..SizeLimits::default()
        };
        let validator = DocumentValidator::new(Arc::new(MagicByteSniffer), limits, dir.path());

        let err = validator.validate(b"more than eight bytes", "notes.txt").unwrap_err();
        assert!(matches!(err, ValidationError::FileTooLarge { size: 21, limit: 8 }));
    }

    #[tokio::test]
    async fn test_stage_rejects_binary_named_txt_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let validator = validator(dir.path());

        let bytes = Bytes::from_static(b"PK\x03\x04\x14\0\0\0\x08\0");
        let err = validator.stage(bytes, "claim.txt").await.unwrap_err();

        assert!(matches!(err, ValidationError::UnsupportedType { .. }));
        assert_eq!(err.code(), "INVALID_FILE_TYPE");
        assert!(dir_entries(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_stage_rejects_oversized_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let limits = SizeLimits {
            png_bytes: 4,
            ..SizeLimits::default()
        };
        let validator = DocumentValidator::new(Arc::new(MagicByteSniffer), limits, dir.path());

        let err = validator
            .stage(Bytes::from_static(PNG_HEADER), "scan.png")
            .await
            .unwrap_err();

        assert_eq!(err.code(), "FILE_TOO_LARGE");
        assert!(dir_entries(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_stage_then_persist_moves_into_upload_dir() {
        let dir = tempfile::tempdir().unwrap();
        let validator = validator(dir.path());

        let staged = validator
            .stage(Bytes::from_static(b"Claim Type: Auto\n"), "../../notes.txt")
            .await
            .unwrap();
        assert_eq!(staged.content_type(), &ContentType::PlainText);
        assert_eq!(staged.file_name(), "notes.txt");

        let stored = staged.persist(dir.path()).unwrap();

        assert_eq!(stored.file_type, "text/plain");
        assert_eq!(stored.file_size, 17);
        assert_eq!(stored.file_name, "notes.txt");

        let entries = dir_entries(dir.path());
        assert_eq!(entries.len(), 1);
        assert!(entries[0].ends_with("-notes.txt"));
        assert_eq!(
            std::fs::read_to_string(&stored.path).unwrap(),
            "Claim Type: Auto\n"
        );
    }

    #[tokio::test]
    async fn test_same_declared_name_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let validator = validator(dir.path());

        let first = validator
            .stage(Bytes::from_static(b"first receipt\n"), "receipt.txt")
            .await
            .unwrap()
            .persist(dir.path())
            .unwrap();
        let second = validator
            .stage(Bytes::from_static(b"%PDF-1.4\nsecond"), "receipt.txt")
            .await
            .unwrap()
            .persist(dir.path())
            .unwrap();

        assert_ne!(first.path, second.path);
        assert_eq!(first.file_name, second.file_name);
        assert_eq!(std::fs::read_to_string(&first.path).unwrap(), "first receipt\n");
        assert_eq!(dir_entries(dir.path()).len(), 2);
    }

    #[tokio::test]
    async fn test_stage_creates_missing_upload_dir() {
        let root = tempfile::tempdir().unwrap();
        let uploads = root.path().join("uploads");
        let validator = validator(&uploads);

        let staged = validator
            .stage(Bytes::from_static(b"%PDF-1.4\n"), "scan.pdf")
            .await
            .unwrap();

        assert!(uploads.is_dir());
        assert!(staged.path().starts_with(&uploads));
    }

    #[tokio::test]
    async fn test_validate_path_reads_file_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.bin");
        std::fs::write(&path, b"%PDF-1.7\n").unwrap();

        let content_type = validator(dir.path()).validate_path(&path).await.unwrap();
        assert_eq!(content_type, ContentType::Pdf);
    }
}
