use askama::Template;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;

use super::{wants_html, wants_json};

#[derive(Template)]
#[template(path = "pages/not_found.html")]
struct NotFoundTemplate;

pub async fn not_found_handler(headers: HeaderMap) -> Response {
    not_found_response(&headers)
}

/// 404 in whatever form the client asked for.
pub fn not_found_response(headers: &HeaderMap) -> Response {
    if wants_json(headers) {
        let err_msg = serde_json::json!({"success": false, "message": "not found"});
        return (StatusCode::NOT_FOUND, Json(err_msg)).into_response();
    }
    if !wants_html(headers) {
        return plain_not_found();
    }
    match NotFoundTemplate.render() {
        Ok(body) => (StatusCode::NOT_FOUND, Html(body)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to render not found page");
            plain_not_found()
        }
    }
}

fn plain_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        [(axum::http::header::CONTENT_TYPE, "text/plain")],
        "not found",
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::{ACCEPT, CONTENT_TYPE};

    fn accepting(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, value.parse().unwrap());
        headers
    }

    fn content_type(response: &Response) -> &str {
        response.headers()[CONTENT_TYPE].to_str().unwrap()
    }

    #[tokio::test]
    async fn test_negotiates_body() {
        let response = not_found_handler(accepting("application/json")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(content_type(&response).starts_with("application/json"));

        let response = not_found_handler(accepting("text/html,*/*;q=0.8")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(content_type(&response).starts_with("text/html"));

        let response = not_found_handler(accepting("application/json;q=0, text/html")).await;
        assert!(content_type(&response).starts_with("text/html"));

        let response = not_found_handler(accepting("text/html;q=0, */*")).await;
        assert_eq!(content_type(&response), "text/plain");

        let response = not_found_handler(HeaderMap::new()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(content_type(&response), "text/plain");
    }
}
