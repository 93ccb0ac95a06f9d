use axum::http::{HeaderMap, StatusCode};

use common::prelude::StoreError;

mod not_found;

pub use not_found::{not_found_handler, not_found_response};

/// Check if the Accept header prefers JSON over HTML.
///
/// JSON must be listed with a nonzero quality. It wins over `text/html` on a
/// higher quality, or on a tie by being listed first. Wildcards count for
/// neither.
pub fn wants_json(headers: &HeaderMap) -> bool {
    let Some(json) = accept_rank(headers, "application/json") else {
        return false;
    };
    match accept_rank(headers, "text/html") {
        Some(html) => {
            json.quality > html.quality
                || (json.quality == html.quality && json.position < html.position)
        }
        None => true,
    }
}

/// Check if the Accept header lists `text/html` with a nonzero quality
pub fn wants_html(headers: &HeaderMap) -> bool {
    accept_rank(headers, "text/html").is_some()
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct AcceptRank {
    quality: f32,
    position: usize,
}

/// Where `media_type` appears in the Accept header and with what quality.
/// Absent, unparsable and `q=0` entries all come back as `None`.
fn accept_rank(headers: &HeaderMap, media_type: &str) -> Option<AcceptRank> {
    let accept = headers
        .get(axum::http::header::ACCEPT)
        .and_then(|h| h.to_str().ok())?;

    accept
        .split(',')
        .enumerate()
        .find_map(|(position, range)| {
            let mut params = range.split(';').map(str::trim);
            let name = params.next()?;
            if !name.eq_ignore_ascii_case(media_type) {
                return None;
            }
            let quality = params
                .filter_map(|param| param.split_once('='))
                .find(|(key, _)| key.trim().eq_ignore_ascii_case("q"))
                .map_or(Some(1.0), |(_, value)| value.trim().parse::<f32>().ok())?;
            Some(AcceptRank { quality, position })
        })
        .filter(|rank| rank.quality > 0.0)
}

/// Status code a storage failure maps to. Never leaks the cause.
pub fn store_error_status(err: &StoreError) -> StatusCode {
    match err {
        StoreError::PathTraversal(_) => StatusCode::FORBIDDEN,
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        StoreError::InvalidName(_) => StatusCode::BAD_REQUEST,
        StoreError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Client facing message for a storage failure.
pub fn store_error_message(err: &StoreError) -> &'static str {
    match err {
        StoreError::PathTraversal(_) => "Forbidden",
        StoreError::NotFound(_) => "File not found",
        StoreError::InvalidName(_) => "Invalid file name",
        StoreError::Io(_) => "Server error processing request",
    }
}
