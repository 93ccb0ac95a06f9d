use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;
use tokio::io::AsyncRead;

use crate::atomic;
use crate::hidden::HiddenPatternSet;
use crate::last_change::LastChange;
use crate::path::{hides_traversal, PathResolver, PathTraversal};

/// One file in the shared root, as seen by a listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileEntry {
    pub name: String,
    pub is_dir: bool,
    pub size_bytes: Option<u64>,
    pub modified: Option<DateTime<Local>>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    PathTraversal(#[from] PathTraversal),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid file name: {0:?}")]
    InvalidName(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Files inside the shared root.
///
/// Every name goes through the [`PathResolver`] before the filesystem is
/// touched, and names matching the [`HiddenPatternSet`] behave as if they
/// did not exist.
#[derive(Debug, Clone)]
pub struct FileStore {
    resolver: PathResolver,
    hidden: HiddenPatternSet,
    last_change: LastChange,
}

impl FileStore {
    pub fn new(resolver: PathResolver, hidden: HiddenPatternSet, last_change: LastChange) -> Self {
        Self {
            resolver,
            hidden,
            last_change,
        }
    }

    pub fn root(&self) -> &Path {
        self.resolver.root()
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    pub fn hidden(&self) -> &HiddenPatternSet {
        &self.hidden
    }

    pub fn last_change(&self) -> &LastChange {
        &self.last_change
    }

    /// Regular files directly under the root, hidden names left out, sorted
    /// case-insensitively by name. Read fresh from disk on every call.
    pub async fn list(&self) -> Result<Vec<FileEntry>, StoreError> {
        let mut entries = Vec::new();
        let mut dir = tokio::fs::read_dir(self.root()).await?;

        while let Some(entry) = dir.next_entry().await? {
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    tracing::debug!(name = ?raw, "skipping non UTF-8 file name");
                    continue;
                }
            };
            if self.hidden.is_hidden(&name) {
                continue;
            }

            // Follows symlinks, so a link to a directory is left out too
            let metadata = match tokio::fs::metadata(entry.path()).await {
                Ok(metadata) => metadata,
                Err(e) => {
                    tracing::debug!(name = %name, error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            if !metadata.is_file() {
                continue;
            }
            // Links out of the root would only ever be refused when requested
            match tokio::fs::canonicalize(entry.path()).await {
                Ok(canonical) if canonical.starts_with(self.root()) => {}
                _ => {
                    tracing::debug!(name = %name, "skipping entry that leaves the shared root");
                    continue;
                }
            }

            entries.push(FileEntry {
                name,
                is_dir: false,
                size_bytes: Some(metadata.len()),
                modified: metadata.modified().ok().map(DateTime::<Local>::from),
            });
        }

        entries.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(entries)
    }

    /// Absolute path of the regular file called `requested`.
    ///
    /// `requested` is a plain name, the same form [`write`](Self::write) takes;
    /// URL decoding belongs to the caller (see [`PathResolver::decode`]).
    /// Hidden or missing files are reported as [`StoreError::NotFound`].
    pub async fn locate(&self, requested: &str) -> Result<PathBuf, StoreError> {
        let path = self.resolver.resolve_decoded(requested)?;
        let not_found = || StoreError::NotFound(requested.to_string());

        let relative = self.resolver.relative(&path).ok_or_else(not_found)?;
        if relative.as_os_str().is_empty() || self.hidden.hides_path(relative) {
            return Err(not_found());
        }

        let canonical = match tokio::fs::canonicalize(&path).await {
            Ok(canonical) => canonical,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(not_found()),
            Err(e) => return Err(e.into()),
        };
        // A symlink inside the root may still point outside of it
        if !canonical.starts_with(self.root()) {
            return Err(PathTraversal {
                requested: requested.to_string(),
            }
            .into());
        }

        let metadata = tokio::fs::metadata(&canonical).await?;
        if !metadata.is_file() {
            return Err(not_found());
        }
        Ok(canonical)
    }

    /// Open a file for reading. Same rules as [`locate`](Self::locate).
    pub async fn read(&self, requested: &str) -> Result<tokio::fs::File, StoreError> {
        let path = self.locate(requested).await?;
        Ok(tokio::fs::File::open(path).await?)
    }

    /// Overwrite the file `name` with everything `reader` yields.
    ///
    /// `name` is a plain relative name, not URL-encoded. The body is streamed
    /// through a fixed-size buffer, so memory use does not grow with the file.
    /// The destination only changes once the whole body has been written.
    pub async fn write<R>(&self, name: &str, reader: R) -> Result<u64, StoreError>
    where
        R: AsyncRead,
    {
        let invalid = || StoreError::InvalidName(name.to_string());
        // A name that decodes into a traversal could never be downloaded again
        if name.trim().is_empty() || hides_traversal(name) {
            return Err(invalid());
        }

        let path = self.resolver.resolve_name(name)?;
        let relative = self.resolver.relative(&path).ok_or_else(invalid)?;
        if self.hidden.hides_path(relative) {
            return Err(invalid());
        }
        if tokio::fs::metadata(&path).await.is_ok_and(|m| m.is_dir()) {
            return Err(invalid());
        }

        let written = atomic::stream_to(&path, reader).await?;
        tracing::info!(name = %name, bytes = written, "file written");

        self.last_change.touch_logged().await;
        Ok(written)
    }
}
