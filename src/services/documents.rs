use std::path::{Path, PathBuf};

use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::core::config::Settings;

#[derive(Debug, Error)]
pub(crate) enum DocumentError {
    #[error("failed to create upload directory {}: {source}", path.display())]
    CreateDir { path: PathBuf, source: std::io::Error },
    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: std::io::Error },
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: std::io::Error },
}

/// What an uploaded document is used for; becomes the stored filename prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DocumentRole {
    Exam,
    AnswerKey,
}

impl DocumentRole {
    pub(crate) fn prefix(self) -> &'static str {
        match self {
            Self::Exam => "exam",
            Self::AnswerKey => "answer_key",
        }
    }
}

/// Uploaded exam documents on the local filesystem.
#[derive(Debug, Clone)]
pub(crate) struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    pub(crate) async fn from_settings(settings: &Settings) -> Result<Self, DocumentError> {
        Self::open(settings.uploads().dir.clone()).await
    }

    pub(crate) async fn open(root: PathBuf) -> Result<Self, DocumentError> {
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|source| DocumentError::CreateDir { path: root.clone(), source })?;
        Ok(Self { root })
    }

    pub(crate) fn root(&self) -> &Path {
        &self.root
    }

    /// Writes `bytes` under a unique `<role>_<uuid>_<unix>.<ext>` name and returns the path.
    pub(crate) async fn save(
        &self,
        role: DocumentRole,
        original_filename: &str,
        bytes: &[u8],
    ) -> Result<String, DocumentError> {
        let path = self.root.join(stored_filename(role, original_filename));

        if let Err(source) = tokio::fs::write(&path, bytes).await {
            if let Err(err) = tokio::fs::remove_file(&path).await {
                if err.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(
                        error = %err,
                        path = %path.display(),
                        "Failed to clean up partial upload"
                    );
                }
            }
            return Err(DocumentError::Write { path, source });
        }

        tracing::debug!(path = %path.display(), role = role.prefix(), "Stored uploaded document");
        Ok(path.to_string_lossy().into_owned())
    }

    /// Best-effort removal of a stored document that no session ended up referencing.
    pub(crate) async fn discard(&self, path: &str) {
        if let Err(err) = tokio::fs::remove_file(path).await {
            if err.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(error = %err, path, "Failed to remove orphaned upload");
            }
        }
    }

    pub(crate) async fn read_text(&self, path: &str) -> Result<String, DocumentError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| DocumentError::Read { path: PathBuf::from(path), source })?;
        Ok(extract_text(&bytes))
    }
}

/// Plain text of an uploaded document. PDF text extraction happens upstream; the
/// bytes are decoded as UTF-8 with invalid sequences replaced.
pub(crate) fn extract_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

pub(crate) fn file_extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

fn stored_filename(role: DocumentRole, original_filename: &str) -> String {
    let timestamp = OffsetDateTime::now_utc().unix_timestamp();
    let extension = Path::new(original_filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default();
    format!("{}_{}_{}{}", role.prefix(), Uuid::new_v4(), timestamp, extension)
}
