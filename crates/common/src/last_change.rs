use std::io;
use std::path::{Path, PathBuf};

use chrono::{Local, SecondsFormat};

use crate::atomic;

/// Current local time as an RFC 3339 / ISO-8601 string with microseconds.
pub fn now_iso8601() -> String {
    Local::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// The last-change timestamp, kept as text in its own file.
///
/// Both the note store and the file store touch it after a successful write.
/// It is metadata only: failing to update it never fails the write that
/// triggered it.
#[derive(Debug, Clone)]
pub struct LastChange {
    path: PathBuf,
}

impl LastChange {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored timestamp, or `None` when there is none yet or it can't be read.
    pub async fn read(&self) -> Option<String> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => {
                let trimmed = contents.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to read last change file");
                None
            }
        }
    }

    /// Record the current time and return it.
    pub async fn touch(&self) -> io::Result<String> {
        let now = now_iso8601();
        atomic::write_to(&self.path, now.as_bytes()).await?;
        tracing::debug!(last_change = %now, "last change updated");
        Ok(now)
    }

    /// Like [`touch`](Self::touch), but logs a failure instead of returning it.
    pub async fn touch_logged(&self) -> Option<String> {
        match self.touch().await {
            Ok(now) => Some(now),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to write last change file");
                None
            }
        }
    }

    /// Seed the file on first start so readers always find a timestamp.
    pub async fn init(&self) -> io::Result<()> {
        if tokio::fs::try_exists(&self.path).await? {
            return Ok(());
        }
        self.touch().await.map(|_| ())
    }
}
