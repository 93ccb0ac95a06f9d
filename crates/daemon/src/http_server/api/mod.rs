use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use http::header::{ACCEPT, CONTENT_TYPE, ORIGIN};
use http::Method;
use tower_http::cors::{Any, CorsLayer};

pub mod files;
pub mod note;
pub mod upload;

use super::handlers::not_found_handler;
use crate::ServiceState;

pub fn router(state: ServiceState, max_upload_bytes: usize) -> Router<ServiceState> {
    let cors_layer = CorsLayer::new()
        .allow_methods(vec![Method::GET, Method::POST])
        .allow_headers(vec![ACCEPT, CONTENT_TYPE, ORIGIN])
        .allow_origin(Any)
        .allow_credentials(false);

    Router::new()
        .route(
            "/note",
            get(note::get_handler)
                .post(note::set_handler)
                .fallback(not_found_handler),
        )
        .route("/files", get(files::handler).fallback(not_found_handler))
        .route(
            "/upload",
            post(upload::handler)
                .layer(DefaultBodyLimit::max(max_upload_bytes))
                .fallback(not_found_handler),
        )
        .with_state(state)
        .layer(cors_layer)
}
