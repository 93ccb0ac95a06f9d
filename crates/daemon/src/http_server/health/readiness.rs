use std::path::Path;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tokio::time::timeout;

use crate::ServiceState;

const READINESS_TIMEOUT: Duration = Duration::from_secs(10);

/// Ready while the shared folder can be listed and the note file is still
/// in place. A stalled network mount counts as not ready.
#[tracing::instrument(skip(state))]
pub async fn handler(State(state): State<ServiceState>) -> Response {
    let check = async {
        check_shared_root(state.files().root()).await?;
        check_note_file(state.notes().path()).await
    };

    let result = match timeout(READINESS_TIMEOUT, check).await {
        Ok(result) => result,
        Err(_) => Err(NotReady::TimedOut),
    };

    match result {
        Ok(()) => {
            let msg = serde_json::json!({"status": "ok"});
            (StatusCode::OK, Json(msg)).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "not ready");
            let msg = serde_json::json!({"status": "failure", "message": e.to_string()});
            (StatusCode::SERVICE_UNAVAILABLE, Json(msg)).into_response()
        }
    }
}

async fn check_shared_root(root: &Path) -> Result<(), NotReady> {
    let metadata = tokio::fs::metadata(root)
        .await
        .map_err(NotReady::SharedFolder)?;
    if !metadata.is_dir() {
        return Err(NotReady::NotADirectory);
    }
    let mut entries = tokio::fs::read_dir(root)
        .await
        .map_err(NotReady::SharedFolder)?;
    entries.next_entry().await.map_err(NotReady::SharedFolder)?;
    Ok(())
}

async fn check_note_file(path: &Path) -> Result<(), NotReady> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) if metadata.is_file() => Ok(()),
        Ok(_) => Err(NotReady::NoteFile(std::io::ErrorKind::InvalidInput.into())),
        Err(e) => Err(NotReady::NoteFile(e)),
    }
}

#[derive(Debug, thiserror::Error)]
enum NotReady {
    #[error("shared folder isn't available: {0}")]
    SharedFolder(std::io::Error),
    #[error("shared folder is not a directory")]
    NotADirectory,
    #[error("note file isn't available: {0}")]
    NoteFile(std::io::Error),
    #[error("health check timed out")]
    TimedOut,
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;
    use crate::ServiceConfig;

    async fn ready_state() -> (tempfile::TempDir, ServiceConfig, ServiceState) {
        let dir = tempfile::tempdir().unwrap();
        let config = ServiceConfig::rooted_at(dir.path());
        let state = ServiceState::from_config(&config).await.unwrap();
        (dir, config, state)
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_ready_with_fresh_layout() {
        let (_dir, _config, state) = ready_state().await;

        let response = handler(State(state)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_missing_shared_folder() {
        let (_dir, config, state) = ready_state().await;
        std::fs::remove_dir_all(&config.shared_dir).unwrap();

        let response = handler(State(state)).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let json = body_json(response).await;
        assert_eq!(json["status"], "failure");
        assert!(json["message"]
            .as_str()
            .unwrap()
            .starts_with("shared folder isn't available"));
    }

    #[tokio::test]
    async fn test_shared_folder_replaced_by_file() {
        let (_dir, config, state) = ready_state().await;
        std::fs::remove_dir_all(&config.shared_dir).unwrap();
        std::fs::write(&config.shared_dir, b"not a folder").unwrap();

        let response = handler(State(state)).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            body_json(response).await["message"],
            "shared folder is not a directory"
        );
    }

    #[tokio::test]
    async fn test_missing_note_file() {
        let (_dir, config, state) = ready_state().await;
        std::fs::remove_file(&config.note_file).unwrap();

        let response = handler(State(state)).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
