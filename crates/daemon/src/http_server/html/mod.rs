use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use super::handlers::not_found_handler;
use crate::ServiceState;

pub mod index;
pub mod note;
pub mod upload;

/// Browser facing routes: the index page and its two forms.
pub fn router(state: ServiceState, max_upload_bytes: usize) -> Router<ServiceState> {
    Router::new()
        .route("/", get(index::handler).fallback(not_found_handler))
        .route("/save_note", post(note::handler).fallback(not_found_handler))
        .route(
            "/upload",
            post(upload::handler)
                .layer(DefaultBodyLimit::max(max_upload_bytes))
                .fallback(not_found_handler),
        )
        .with_state(state)
}
