use axum::extract::multipart::{Field, Multipart, MultipartRejection};
use axum::http::StatusCode;
use futures::TryStreamExt;
use serde::Serialize;
use tokio_util::io::StreamReader;

use common::prelude::{FileStore, StoreError};

/// Multipart field names that carry files. Anything else is skipped.
pub const FILE_FIELDS: [&str; 3] = ["file", "files", "files[]"];

/// What happened to each file of one upload request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UploadOutcome {
    /// Stored names, in the order they arrived
    pub uploaded: Vec<String>,
    /// One message per file that was not stored
    pub errors: Vec<String>,
    #[serde(rename = "lastChange")]
    pub last_change: Option<String>,
}

impl UploadOutcome {
    pub fn attempted(&self) -> usize {
        self.uploaded.len() + self.errors.len()
    }

    pub fn message(&self) -> String {
        let mut message = format!("Successfully uploaded {} file(s).", self.uploaded.len());
        if !self.errors.is_empty() {
            message.push_str(&format!(" Errors: {}", self.errors.join("; ")));
        }
        message
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("expected a multipart/form-data body: {0}")]
    UnsupportedMediaType(String),
    #[error("malformed multipart body: {0}")]
    Malformed(String),
    #[error("no file was selected")]
    NoFiles,
    #[error("Upload failed. Errors: {}", .0.join("; "))]
    AllFailed(Vec<String>),
}

impl UploadError {
    pub fn status(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

/// Reduce a client supplied file name to a bare name inside the shared root.
///
/// Both `/` and `\` count as separators. Names that try to climb with `..`
/// are refused outright instead of being stripped down to their last part.
pub fn sanitize_filename(raw: &str) -> Result<String, StoreError> {
    let invalid = || StoreError::InvalidName(raw.to_string());

    let segments: Vec<&str> = raw.split(['/', '\\']).collect();
    if segments.iter().any(|segment| segment.trim() == "..") {
        return Err(invalid());
    }

    let name = segments.last().copied().unwrap_or_default();
    if name.trim().is_empty() || name == "." {
        return Err(invalid());
    }
    Ok(name.to_string())
}

/// Store every file part of a multipart body.
///
/// Each file is streamed straight to disk. A file that fails is recorded in
/// [`UploadOutcome::errors`] and the rest of the batch carries on.
pub async fn receive(
    store: &FileStore,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<UploadOutcome, UploadError> {
    let mut multipart =
        multipart.map_err(|e| UploadError::UnsupportedMediaType(e.body_text()))?;
    let mut outcome = UploadOutcome::default();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) if outcome.attempted() == 0 => {
                return Err(UploadError::Malformed(e.body_text()));
            }
            Err(e) => {
                tracing::warn!(error = %e, "connection interrupted during upload");
                outcome
                    .errors
                    .push("Upload interrupted before all files were received.".to_string());
                break;
            }
        };

        if !field.name().is_some_and(|name| FILE_FIELDS.contains(&name)) {
            continue;
        }
        // An empty file input still sends a part, just without a name
        let Some(raw_name) = field.file_name().filter(|n| !n.is_empty()) else {
            continue;
        };
        let raw_name = raw_name.to_string();

        match save_field(store, &raw_name, field).await {
            Ok(name) => outcome.uploaded.push(name),
            Err(e) => {
                tracing::warn!(name = %raw_name, error = %e, "upload rejected");
                outcome.errors.push(describe_failure(&raw_name, &e));
            }
        }
    }

    if outcome.uploaded.is_empty() {
        return Err(if outcome.errors.is_empty() {
            UploadError::NoFiles
        } else {
            UploadError::AllFailed(outcome.errors)
        });
    }

    outcome.last_change = store.last_change().read().await;
    tracing::info!(
        uploaded = outcome.uploaded.len(),
        failed = outcome.errors.len(),
        "upload finished"
    );
    Ok(outcome)
}

async fn save_field(
    store: &FileStore,
    raw_name: &str,
    field: Field<'_>,
) -> Result<String, StoreError> {
    let name = sanitize_filename(raw_name)?;
    let body = StreamReader::new(field.map_err(std::io::Error::other));
    store.write(&name, body).await?;
    Ok(name)
}

fn describe_failure(raw_name: &str, err: &StoreError) -> String {
    match err {
        StoreError::PathTraversal(_) | StoreError::InvalidName(_) => {
            format!("Blocked '{raw_name}': invalid file name.")
        }
        StoreError::NotFound(_) | StoreError::Io(_) => format!("Failed to save '{raw_name}'."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_basename() {
        assert_eq!(sanitize_filename("report.pdf").unwrap(), "report.pdf");
        assert_eq!(sanitize_filename("C:\\Users\\me\\a.txt").unwrap(), "a.txt");
        assert_eq!(sanitize_filename("photos/2024/cat.jpg").unwrap(), "cat.jpg");
        assert_eq!(sanitize_filename("100%.txt").unwrap(), "100%.txt");
    }

    #[test]
    fn test_sanitize_rejects() {
        for raw in ["../../evil.txt", "..\\evil.txt", "a/../b.txt", "", "  ", "dir/", ".", ".."] {
            assert!(
                matches!(sanitize_filename(raw), Err(StoreError::InvalidName(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_outcome_message() {
        let outcome = UploadOutcome {
            uploaded: vec!["a.txt".to_string(), "b.txt".to_string()],
            errors: vec!["Blocked '../x': invalid file name.".to_string()],
            last_change: None,
        };
        assert_eq!(outcome.attempted(), 3);
        let message = outcome.message();
        assert!(message.starts_with("Successfully uploaded 2 file(s)."));
        assert!(message.contains("Blocked '../x'"));
    }
}
