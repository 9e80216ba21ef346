use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use layerkit_client::{BuildMode, ClientConfig, Url};
use serde_json::{json, Value};
use tokio::net::TcpListener;

pub const PSD_BYTES: &[u8] = b"8BPS\x00\x01composite";
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nlayer";
pub const SLOW_DELAY: Duration = Duration::from_millis(600);

/// One request seen by the stub service.
#[derive(Debug, Clone)]
pub struct Hit {
    pub method: &'static str,
    pub path: String,
    /// Multipart fields as (name, value); file parts record their file name.
    pub fields: Vec<(String, String)>,
}

#[derive(Clone, Default)]
pub struct StubState {
    hits: Arc<Mutex<Vec<Hit>>>,
}

impl StubState {
    fn record(&self, hit: Hit) {
        self.hits.lock().unwrap().push(hit);
    }
}

/// In-process stand-in for the layering service.
pub struct StubService {
    pub addr: SocketAddr,
    state: StubState,
}

impl StubService {
    pub async fn start() -> Self {
        let state = StubState::default();
        let app = Router::new()
            .route("/api/health", get(health))
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

        Self { addr, state }
    }

    pub fn origin(&self) -> Url {
        Url::parse(&format!("http://{}", self.addr)).unwrap()
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::for_mode(BuildMode::Production).with_origin(self.origin())
    }

    pub fn hits(&self) -> Vec<Hit> {
        self.state.hits.lock().unwrap().clone()
    }
}

pub fn completed_body() -> Value {
    json!({
        "status": "COMPLETED",
        "layers": [{"name": "bg", "url": "/x.png", "width": 100, "height": 50}]
    })
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

async fn upload(State(state): State<StubState>, mut multipart: Multipart) -> Json<Value> {
    let mut fields = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let value = match file_name {
            Some(file_name) => file_name,
            None => field.text().await.unwrap(),
        };
        fields.push((name, value));
    }
    state.record(Hit {
        method: "POST",
        path: "/api/upload".to_string(),
        fields,
    });

    Json(json!({"task_id": "a1b2c3d4e5f6", "status": "PROCESSING", "queue_position": 1}))
}

async fn task(State(state): State<StubState>, Path(task_id): Path<String>) -> Response {
    state.record(Hit {
        method: "GET",
        path: format!("/api/task/{}", task_id),
        fields: Vec::new(),
    });

    match task_id.as_str() {
        "done" => Json(completed_body()).into_response(),
        "failed" => Json(json!({"status": "FAILED", "error": "timed out"})).into_response(),
        "garbled" => (StatusCode::OK, "<html>oops</html>").into_response(),
        "slow" => {
            tokio::time::sleep(SLOW_DELAY).await;
            Json(json!({"status": "PROCESSING", "message": "working"})).into_response()
        }
        _ => (StatusCode::NOT_FOUND, Json(json!({"detail": "task not found"}))).into_response(),
    }
}

async fn download(State(state): State<StubState>, Path(task_id): Path<String>) -> Response {
    state.record(Hit {
        method: "GET",
        path: format!("/api/download/{}", task_id),
        fields: Vec::new(),
    });

    match task_id.as_str() {
        "done" => (
            [(header::CONTENT_TYPE, "application/octet-stream")],
            Bytes::from_static(PSD_BYTES),
        )
            .into_response(),
        "slow" => {
            tokio::time::sleep(SLOW_DELAY).await;
            Bytes::from_static(PSD_BYTES).into_response()
        }
        _ => (StatusCode::BAD_REQUEST, "task not finished").into_response(),
    }
}

async fn layer(State(state): State<StubState>, Path(file): Path<String>) -> Response {
    state.record(Hit {
        method: "GET",
        path: format!("/layers/{}", file),
        fields: Vec::new(),
    });

    match file.as_str() {
        "bg.png" => ([(header::CONTENT_TYPE, "image/png")], Bytes::from_static(PNG_BYTES))
            .into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}
