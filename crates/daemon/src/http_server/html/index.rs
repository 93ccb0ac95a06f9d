use askama::Template;
use askama_axum::IntoResponse;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use tracing::instrument;

use common::prelude::FileEntry;

use crate::http_server::files::file_url;
use crate::http_server::handlers::wants_json;
use crate::ServiceState;

/// One row of the file table
#[derive(Debug, Clone)]
pub struct FileRow {
    pub name: String,
    pub href: String,
    pub size: String,
    pub modified: String,
}

impl From<&FileEntry> for FileRow {
    fn from(entry: &FileEntry) -> Self {
        Self {
            name: entry.name.clone(),
            href: file_url(&entry.name),
            size: entry.size_bytes.map(format_size).unwrap_or_default(),
            modified: entry
                .modified
                .map(|m| m.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
        }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub note: String,
    pub last_change: String,
    pub files: Vec<FileRow>,
}

#[instrument(skip(state, headers))]
pub async fn handler(State(state): State<ServiceState>, headers: HeaderMap) -> askama_axum::Response {
    let note = state.notes().get().await;

    if wants_json(&headers) {
        let body = serde_json::json!({"note": note.text, "lastChange": note.last_change});
        return (StatusCode::OK, Json(body)).into_response();
    }

    // A listing failure still renders the note
    let files = match state.files().list().await {
        Ok(entries) => entries.iter().map(FileRow::from).collect(),
        Err(e) => {
            tracing::error!(error = %e, "failed to list shared folder");
            Vec::new()
        }
    };

    let template = IndexTemplate {
        note: note.text,
        last_change: note.last_change.unwrap_or_else(|| "never".to_string()),
        files,
    };

    template.into_response()
}

/// Human readable size, binary units with one decimal.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["KB", "MB", "GB", "TB", "PB"];

    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}
