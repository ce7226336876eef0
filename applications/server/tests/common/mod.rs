//! Common test utilities and fixtures
//!
//! Each `TestApp` owns a real SQLite database file in a temp directory that
//! backs both the job queue and the playlist table.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use dj_server::{config::ServiceConfig, services::Backends, AppState};
use serde_json::Value;
use tempfile::TempDir;
use tower::util::ServiceExt;

pub struct TestApp {
    pub config: ServiceConfig,
    pub backends: Backends,
    _temp_dir: TempDir,
}

impl TestApp {
    /// Queue and table configured, recommendations offline
    pub async fn new() -> Self {
        Self::with(|_| {}).await
    }

    /// Start from the default test config and adjust it before opening backends
    pub async fn with(adjust: impl FnOnce(&mut ServiceConfig)) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let db_url = format!("sqlite://{}", temp_dir.path().join("dj.db").display());

        let mut config = ServiceConfig::default();
        config.queue.url = Some(db_url.clone());
        config.storage.table_url = Some(db_url);
        config.recommend.offline = true;
        config.queue.retry_delay_secs = 0;
        adjust(&mut config);

        let backends = Backends::open(&config).await.unwrap();

        Self {
            config,
            backends,
            _temp_dir: temp_dir,
        }
    }

    pub fn state(&self) -> AppState {
        self.backends.app_state(&self.config)
    }

    pub fn router(&self) -> Router {
        dj_server::router(self.state(), &self.config.server.allowed_origins)
    }
}

/// Send a request and decode the JSON body (Null when empty)
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let body = if body_bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };
    (status, body)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("POST")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}
