use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;
use tracing::instrument;

use crate::ServiceState;

#[derive(Debug, Deserialize)]
pub struct NoteForm {
    #[serde(default)]
    pub note: String,
}

/// `POST /save_note`: replace the note, then back to the index.
#[instrument(skip(state, form))]
pub async fn handler(
    State(state): State<ServiceState>,
    form: Result<Form<NoteForm>, FormRejection>,
) -> Response {
    let Form(form) = match form {
        Ok(form) => form,
        Err(e) => {
            tracing::warn!(error = %e, "rejected note form");
            return (e.status(), e.body_text()).into_response();
        }
    };

    match state.notes().set(&form.note).await {
        Ok(_) => Redirect::to("/").into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to save note");
            (StatusCode::INTERNAL_SERVER_ERROR, "Error: failed to save note").into_response()
        }
    }
}
