use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::http_server::upload::{self, UploadError};
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub uploaded: Vec<String>,
    pub errors: Vec<String>,
    pub last_change: Option<String>,
}

/// `POST /api/upload`. Succeeds when at least one file was stored; the
/// files that were not are listed in `errors`.
pub async fn handler(
    State(state): State<ServiceState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, ApiUploadError> {
    let outcome = upload::receive(state.files(), multipart).await?;

    Ok(Json(UploadResponse {
        success: true,
        message: outcome.message(),
        uploaded: outcome.uploaded,
        errors: outcome.errors,
        last_change: outcome.last_change,
    }))
}

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiUploadError(#[from] UploadError);

impl IntoResponse for ApiUploadError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self.0, "api upload failed");
        let body = serde_json::json!({"success": false, "message": self.0.to_string()});
        (self.0.status(), Json(body)).into_response()
    }
}
