//! In-process layering service for exercising the `run` command.
//!
//! The task id is the stem of the uploaded file name, and it picks how the
//! task behaves:
//! - `staged`: PROCESSING on the first poll, COMPLETED with two layers after
//! - `failed`: FAILED with an error message
//! - `empty`: COMPLETED without layers
//! - anything else: PROCESSING forever

use std::collections::HashMap;
use std::path::Path as FsPath;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::{Multipart, Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use layerkit_client::{BuildMode, ClientConfig, Url};
use serde_json::{json, Value};
use tokio::net::TcpListener;

pub const PSD_BYTES: &[u8] = b"8BPS\x00\x01composite";
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nlayer";

#[derive(Clone, Default)]
struct ServiceState {
    polls: Arc<Mutex<HashMap<String, usize>>>,
    downloads: Arc<Mutex<Vec<String>>>,
}

pub struct TestService {
    origin: Url,
    state: ServiceState,
}

impl TestService {
    pub async fn start() -> Self {
        let state = ServiceState::default();
        let app = Router::new()
            .route("/api/upload", post(upload))
            .route("/api/task/:task_id", get(task))
            .route("/api/download/:task_id", get(download))
            .route("/layers/:file", get(layer))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            origin: Url::parse(&format!("http://{}", addr)).unwrap(),
            state,
        }
    }

    pub fn origin(&self) -> Url {
        self.origin.clone()
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::for_mode(BuildMode::Production).with_origin(self.origin())
    }

    /// Number of status calls seen for a task.
    pub fn polls(&self, task_id: &str) -> usize {
        let polls = self.state.polls.lock().unwrap();
        polls.get(task_id).copied().unwrap_or(0)
    }

    /// Paths of every download request, PSD and layers alike.
    pub fn downloads(&self) -> Vec<String> {
        self.state.downloads.lock().unwrap().clone()
    }
}

async fn upload(mut multipart: Multipart) -> Json<Value> {
    let mut task_id = String::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        if field.name() == Some("file") {
            let file_name = field.file_name().unwrap_or_default();
            task_id = FsPath::new(file_name)
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string();
        }
    }
    Json(json!({"task_id": task_id, "status": "PENDING"}))
}

async fn task(State(state): State<ServiceState>, Path(task_id): Path<String>) -> Json<Value> {
    let poll = {
        let mut polls = state.polls.lock().unwrap();
        let count = polls.entry(task_id.clone()).or_insert(0);
        *count += 1;
        *count
    };

    let body = match (task_id.as_str(), poll) {
        ("staged", 1) => json!({"status": "PROCESSING", "message": "splitting"}),
        ("staged", _) => json!({
            "status": "COMPLETED",
            "layers": [
                {"name": "Layer_0", "url": "/layers/Layer_0.png", "width": 640, "height": 480},
                {"name": "Layer_1", "url": "/layers/Layer_1.png", "width": 320, "height": 200}
            ]
        }),
        ("failed", _) => json!({"status": "FAILED", "error": "model crashed"}),
        ("empty", _) => json!({"status": "COMPLETED", "layers": []}),
        _ => json!({"status": "PROCESSING", "message": null}),
    };
    Json(body)
}

async fn download(State(state): State<ServiceState>, Path(task_id): Path<String>) -> Response {
    state
        .downloads
        .lock()
        .unwrap()
        .push(format!("/api/download/{}", task_id));
    Bytes::from_static(PSD_BYTES).into_response()
}

async fn layer(State(state): State<ServiceState>, Path(file): Path<String>) -> Response {
    state
        .downloads
        .lock()
        .unwrap()
        .push(format!("/layers/{}", file));
    Bytes::from_static(PNG_BYTES).into_response()
}
