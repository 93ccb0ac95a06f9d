use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::atomic;
use crate::last_change::LastChange;
use crate::store::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    pub text: String,
    pub last_change: Option<String>,
}

/// The shared note: one text file plus the last-change timestamp.
///
/// The content file is authoritative. It is replaced first; the timestamp is
/// written afterwards and a failure there is only logged.
#[derive(Debug, Clone)]
pub struct NoteStore {
    path: PathBuf,
    last_change: LastChange,
}

impl NoteStore {
    pub fn new(path: impl Into<PathBuf>, last_change: LastChange) -> Self {
        Self {
            path: path.into(),
            last_change,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create an empty note file if there is none.
    pub async fn init(&self) -> io::Result<()> {
        if tokio::fs::try_exists(&self.path).await? {
            return Ok(());
        }
        atomic::write_to(&self.path, b"").await
    }

    pub async fn get(&self) -> Note {
        let text = match tokio::fs::read(&self.path).await {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to read note file");
                String::new()
            }
        };

        Note {
            text,
            last_change: self.last_change.read().await,
        }
    }

    /// Replace the note and return the new last-change timestamp, if it could
    /// be recorded.
    pub async fn set(&self, text: &str) -> Result<Option<String>, StoreError> {
        atomic::write_to(&self.path, text.as_bytes()).await?;
        tracing::info!(path = %self.path.display(), bytes = text.len(), "note saved");

        Ok(self.last_change.touch_logged().await)
    }
}
