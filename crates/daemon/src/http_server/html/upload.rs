use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use tracing::instrument;

use crate::http_server::upload::{self, UploadError};
use crate::ServiceState;

/// `POST /upload`: store the submitted files, then back to the index.
///
/// An empty submission just returns to the index, like a browser form would
/// expect. Per-file failures are logged and do not stop the rest.
#[instrument(skip(state, multipart))]
pub async fn handler(
    State(state): State<ServiceState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    match upload::receive(state.files(), multipart).await {
        Ok(_) | Err(UploadError::NoFiles) => Redirect::to("/").into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "form upload failed");
            (e.status(), e.to_string()).into_response()
        }
    }
}
