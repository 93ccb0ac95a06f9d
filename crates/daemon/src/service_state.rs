use std::path::{Path, PathBuf};
use std::sync::Arc;

use common::prelude::{FileStore, HiddenPatternSet, LastChange, NoteStore, PathResolver};

use crate::service_config::Config;

/// Main service state, handed to every request handler.
///
/// Holds nothing but resolved paths, so cloning it per request is cheap and
/// there is no in-process lock around the stores: each write is an atomic
/// file replacement on its own.
#[derive(Clone)]
pub struct State {
    inner: Arc<Inner>,
}

struct Inner {
    files: FileStore,
    notes: NoteStore,
}

impl State {
    pub async fn from_config(config: &Config) -> Result<Self, StateSetupError> {
        // 1. Shared root, created once here and never per request
        tokio::fs::create_dir_all(&config.shared_dir)
            .await
            .map_err(|source| StateSetupError::SharedDir {
                path: config.shared_dir.clone(),
                source,
            })?;
        let shared_root = tokio::fs::canonicalize(&config.shared_dir)
            .await
            .map_err(|source| StateSetupError::SharedDir {
                path: config.shared_dir.clone(),
                source,
            })?;

        // 2. Hidden names
        let mut hidden = HiddenPatternSet::standard(&config.note_file, &config.last_change_file);
        for name in &config.hidden_names {
            hidden = hidden.with_name(name.as_str());
        }
        for prefix in &config.hidden_prefixes {
            hidden = hidden.with_prefix(prefix.as_str());
        }

        // 3. Note and last change files
        ensure_parent(&config.last_change_file).await?;
        let last_change = LastChange::new(&config.last_change_file);
        last_change
            .init()
            .await
            .map_err(|source| StateSetupError::StateFile {
                path: config.last_change_file.clone(),
                source,
            })?;

        ensure_parent(&config.note_file).await?;
        let notes = NoteStore::new(&config.note_file, last_change.clone());
        notes
            .init()
            .await
            .map_err(|source| StateSetupError::StateFile {
                path: config.note_file.clone(),
                source,
            })?;

        let files = FileStore::new(PathResolver::new(shared_root), hidden, last_change);

        tracing::info!(shared_root = %files.root().display(), "shared folder");
        tracing::info!(note_file = %config.note_file.display(), "note file");
        tracing::info!(last_change_file = %config.last_change_file.display(), "last change file");

        Ok(Self {
            inner: Arc::new(Inner { files, notes }),
        })
    }

    pub fn files(&self) -> &FileStore {
        &self.inner.files
    }

    pub fn notes(&self) -> &NoteStore {
        &self.inner.notes
    }
}

async fn ensure_parent(path: &Path) -> Result<(), StateSetupError> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    tokio::fs::create_dir_all(parent)
        .await
        .map_err(|source| StateSetupError::StateFile {
            path: path.to_path_buf(),
            source,
        })
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("could not prepare shared folder {path:?}: {source}")]
    SharedDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not prepare {path:?}: {source}")]
    StateFile {
        path: PathBuf,
        source: std::io::Error,
    },
}
