use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tower_http::trace::{DefaultOnFailure, DefaultOnResponse};
use tower_http::LatencyUnit;

pub mod api;
mod config;
pub mod files;
mod handlers;
mod health;
mod html;
pub mod upload;

pub use config::Config;

use crate::ServiceState;

const API_PREFIX: &str = "/api";
const STATUS_PREFIX: &str = "/_status";

/// Body limit for every route except the uploads. Notes are buffered whole.
pub const NOTE_BODY_LIMIT: usize = 1024 * 1024;

/// All routes, without tracing. Paths under `/shared/`, and any other path
/// no route claims, are looked up as files in the shared root. Only the upload
/// routes accept bodies up to `max_upload_bytes`.
pub fn router(config: &Config, state: ServiceState) -> Router {
    Router::new()
        .nest(STATUS_PREFIX, health::router(state.clone()))
        .nest(API_PREFIX, api::router(state.clone(), config.max_upload_bytes))
        .merge(html::router(state.clone(), config.max_upload_bytes))
        .route(
            "/shared/*path",
            get(files::shared_handler).fallback(handlers::not_found_handler),
        )
        .fallback(files::root_handler)
        .layer(DefaultBodyLimit::max(NOTE_BODY_LIMIT))
        .with_state(state)
}

/// Run the HTTP server until `shutdown_rx` fires.
pub async fn run(
    config: Config,
    state: ServiceState,
    mut shutdown_rx: watch::Receiver<()>,
) -> Result<(), HttpServerError> {
    let listen_addr = config.listen_addr;
    let log_level = config.log_level;
    let trace_layer = TraceLayer::new_for_http()
        .on_response(
            DefaultOnResponse::new()
                .include_headers(false)
                .level(log_level)
                .latency_unit(LatencyUnit::Micros),
        )
        .on_failure(DefaultOnFailure::new().latency_unit(LatencyUnit::Micros));

    let router = router(&config, state).layer(trace_layer);

    tracing::info!(addr = ?listen_addr, "file share server listening");
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.changed().await;
        })
        .await?;

    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum HttpServerError {
    #[error("an error occurred running the HTTP server: {0}")]
    ServingFailed(#[from] std::io::Error),
}
