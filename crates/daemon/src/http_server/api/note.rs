use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use common::prelude::StoreError;

use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteResponse {
    pub note: String,
    #[serde(rename = "lastChange")]
    pub last_change: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SetNoteRequest {
    /// Missing means an empty note
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetNoteResponse {
    pub success: bool,
    pub message: String,
    #[serde(rename = "lastChange")]
    pub last_change: Option<String>,
}

/// `GET /api/note`
pub async fn get_handler(State(state): State<ServiceState>) -> Response {
    let note = state.notes().get().await;
    Json(NoteResponse {
        note: note.text,
        last_change: note.last_change,
    })
    .into_response()
}

/// `POST /api/note` with a `{"note": "..."}` body. The content type is not
/// checked, only the body.
pub async fn set_handler(
    State(state): State<ServiceState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<impl IntoResponse, SetNoteError> {
    let body = body?;
    if body.is_empty() {
        return Err(SetNoteError::EmptyBody);
    }
    let request: SetNoteRequest = serde_json::from_slice(&body)?;

    let last_change = state.notes().set(&request.note).await?;
    tracing::info!(bytes = request.note.len(), "note saved");

    Ok(Json(SetNoteResponse {
        success: true,
        message: "Note saved!".to_string(),
        last_change,
    }))
}

#[derive(Debug, thiserror::Error)]
pub enum SetNoteError {
    #[error("No data received.")]
    EmptyBody,
    #[error("{}", .0.body_text())]
    Body(#[from] BytesRejection),
    #[error("Invalid JSON data.")]
    InvalidJson(#[from] serde_json::Error),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for SetNoteError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            SetNoteError::EmptyBody | SetNoteError::InvalidJson(_) => {
                (http::StatusCode::BAD_REQUEST, self.to_string())
            }
            SetNoteError::Body(rejection) => (rejection.status(), self.to_string()),
            SetNoteError::Store(e) => {
                tracing::error!(error = %e, "failed to save note");
                (
                    http::StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to save note.".to_string(),
                )
            }
        };
        let body = serde_json::json!({"success": false, "message": message});
        (status, Json(body)).into_response()
    }
}
