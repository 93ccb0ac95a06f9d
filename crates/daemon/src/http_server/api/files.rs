use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use common::prelude::{FileEntry, StoreError};

use crate::http_server::files::file_url;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    pub name: String,
    /// Where to fetch it, percent-encoded
    pub url: String,
    pub size: u64,
    pub modified: Option<DateTime<Local>>,
    pub mime_type: String,
}

impl From<FileEntry> for FileInfo {
    fn from(entry: FileEntry) -> Self {
        let mime_type = mime_guess::from_path(&entry.name)
            .first_or_octet_stream()
            .to_string();
        Self {
            url: file_url(&entry.name),
            size: entry.size_bytes.unwrap_or_default(),
            modified: entry.modified,
            mime_type,
            name: entry.name,
        }
    }
}

/// `GET /api/files`
pub async fn handler(State(state): State<ServiceState>) -> Result<impl IntoResponse, ListError> {
    let entries = state.files().list().await?;
    let files: Vec<FileInfo> = entries.into_iter().map(FileInfo::from).collect();
    Ok(Json(files))
}

#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for ListError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "failed to list shared folder");
        let body = serde_json::json!({"success": false, "message": "Could not list files."});
        (http::StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
