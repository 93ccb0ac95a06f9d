use axum::extract::{Request, State};
use axum::http::Method;
use axum::response::{IntoResponse, Response};
use tower::ServiceExt;
use tower_http::services::ServeFile;

use common::prelude::StoreError;

use super::handlers::{not_found_response, store_error_message, store_error_status};
use crate::ServiceState;

pub const SHARED_PREFIX: &str = "/shared/";

/// `GET /shared/*path`
pub async fn shared_handler(State(state): State<ServiceState>, request: Request) -> Response {
    let requested = request
        .uri()
        .path()
        .strip_prefix(SHARED_PREFIX)
        .unwrap_or_default()
        .to_string();
    serve(&state, &requested, request).await
}

/// Fallback for unrouted paths: `GET /<name>` serves a file straight off the
/// root, anything else is a 404.
pub async fn root_handler(State(state): State<ServiceState>, request: Request) -> Response {
    if !matches!(*request.method(), Method::GET | Method::HEAD) {
        return not_found_response(request.headers());
    }
    let requested = request.uri().path().trim_start_matches('/').to_string();
    serve(&state, &requested, request).await
}

/// URL a listing links to for a stored name.
pub fn file_url(name: &str) -> String {
    format!("{}{}", SHARED_PREFIX, urlencoding::encode(name))
}

// `requested` is still percent-encoded; this is the one place it gets decoded
async fn serve(state: &ServiceState, requested: &str, request: Request) -> Response {
    let located = match state.files().resolver().decode(requested) {
        Ok(name) => state.files().locate(&name).await,
        Err(e) => Err(e.into()),
    };
    let path = match located {
        Ok(path) => path,
        Err(StoreError::NotFound(_)) => return not_found_response(request.headers()),
        Err(e) => {
            match &e {
                StoreError::PathTraversal(_) => {
                    tracing::warn!(requested = %requested, "blocked path traversal attempt")
                }
                _ => tracing::error!(requested = %requested, error = %e, "failed to locate file"),
            }
            return (store_error_status(&e), store_error_message(&e)).into_response();
        }
    };

    tracing::debug!(path = %path.display(), "serving file");
    match ServeFile::new(&path).oneshot(request).await {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_url_encodes() {
        assert_eq!(file_url("a.txt"), "/shared/a.txt");
        assert_eq!(file_url("my report.pdf"), "/shared/my%20report.pdf");
        assert_eq!(file_url("100%.txt"), "/shared/100%25.txt");
        assert_eq!(file_url("a#b?.txt"), "/shared/a%23b%3F.txt");
    }
}
