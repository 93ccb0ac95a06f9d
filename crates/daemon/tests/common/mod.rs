//! Shared helpers for driving the router in-process
#![allow(dead_code)]

use std::net::SocketAddr;

use axum::body::{to_bytes, Body, Bytes};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use tempfile::TempDir;
use tower::ServiceExt;

use fileshare_daemon::http_server;
use fileshare_daemon::{ServiceConfig, ServiceState};

pub const BOUNDARY: &str = "----fileshare-test-boundary";

pub struct TestServer {
    pub router: Router,
    pub state: ServiceState,
    pub config: ServiceConfig,
    pub temp_dir: TempDir,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn header(&self, name: header::HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// A server over a fresh temporary directory
pub async fn setup_test_server() -> TestServer {
    let temp_dir = TempDir::new().unwrap();
    let config = ServiceConfig::rooted_at(temp_dir.path());
    let state = ServiceState::from_config(&config).await.unwrap();

    let listen_addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
    let http_config = http_server::Config::new(listen_addr, config.max_upload_bytes);
    let router = http_server::router(&http_config, state.clone());

    TestServer {
        router,
        state,
        config,
        temp_dir,
    }
}

impl TestServer {
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn get_accepting(&self, uri: &str, accept: &str) -> TestResponse {
        self.send(
            Request::get(uri)
                .header(header::ACCEPT, accept)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn request(&self, method: Method, uri: &str) -> TestResponse {
        self.send(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
            .await
    }

    /// POST a multipart body built from `(field, filename, contents)` parts
    pub async fn upload(&self, uri: &str, parts: &[(&str, &str, &[u8])]) -> TestResponse {
        self.send(
            Request::post(uri)
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(multipart_body(parts)))
                .unwrap(),
        )
        .await
    }

    /// POST an already built multipart body, complete or not
    pub async fn upload_raw(&self, uri: &str, body: Vec<u8>) -> TestResponse {
        self.send(
            Request::post(uri)
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }

    /// Names in the shared directory, temporary files included
    pub fn shared_entries(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(&self.config.shared_dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    pub fn shared_path(&self, name: &str) -> std::path::PathBuf {
        self.config.shared_dir.join(name)
    }

    pub fn put(&self, name: &str, contents: &[u8]) {
        std::fs::write(self.shared_path(name), contents).unwrap();
    }
}

pub fn multipart_body(parts: &[(&str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (field, filename, contents) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(contents);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}
