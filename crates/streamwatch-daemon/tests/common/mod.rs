//! Fake CouchDB and monitor services for HTTP-level tests

#![allow(dead_code)]

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

pub const TOKEN: &str = "test-token";

/// Serve a router on an ephemeral local port
pub async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// Build an `_all_docs` row holding a stream document
pub fn stream_row(id: &str, url: &str) -> Value {
    json!({
        "id": id,
        "key": id,
        "value": { "rev": "1-abc" },
        "doc": { "_id": id, "_rev": "1-abc", "hlsUrl": url }
    })
}

/// Build a monitor entry in wire format
pub fn monitor_entry(streams: &[(&str, &str)]) -> Value {
    let streams: Vec<Value> = streams
        .iter()
        .map(|(id, url)| json!({ "id": id, "url": url }))
        .collect();
    json!({
        "createdAt": "2024-01-01T00:00:00.000Z",
        "streams": streams,
        "state": "active",
        "errorCount": 0,
        "statusEndpoint": "/monitor/m1/status"
    })
}

#[derive(Default)]
pub struct CouchState {
    pub rows: Vec<Value>,
    pub status: Option<StatusCode>,
    pub auth_headers: Vec<Option<String>>,
}

/// Fake CouchDB serving a single database called `streams`
#[derive(Clone, Default)]
pub struct FakeCouch {
    pub state: Arc<Mutex<CouchState>>,
}

impl FakeCouch {
    pub fn with_rows(rows: Vec<Value>) -> Self {
        let fake = Self::default();
        fake.state.lock().unwrap().rows = rows;
        fake
    }

    pub async fn start(&self) -> SocketAddr {
        let router = Router::new()
            .route("/streams/_all_docs", get(all_docs))
            .with_state(self.clone());
        serve(router).await
    }
}

async fn all_docs(State(fake): State<FakeCouch>, headers: HeaderMap) -> Response {
    let mut state = fake.state.lock().unwrap();
    state.auth_headers.push(
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    );

    if let Some(status) = state.status {
        return (status, Json(json!({ "error": "unavailable" }))).into_response();
    }

    Json(json!({
        "total_rows": state.rows.len(),
        "offset": 0,
        "rows": state.rows.clone(),
    }))
    .into_response()
}

#[derive(Default)]
pub struct MonitorState {
    /// Raw `GET /monitor` body
    pub monitors: Value,
    pub list_status: Option<StatusCode>,
    pub rejected_urls: HashSet<String>,
    pub list_delay: Option<Duration>,
    /// Bodies of every `POST /monitor`
    pub posts: Vec<Value>,
    pub post_content_types: Vec<Option<String>>,
    pub unauthorized_requests: usize,
}

/// Fake HLS monitor service
#[derive(Clone)]
pub struct FakeMonitor {
    pub state: Arc<Mutex<MonitorState>>,
}

impl FakeMonitor {
    pub fn with_monitors(monitors: Value) -> Self {
        Self {
            state: Arc::new(Mutex::new(MonitorState {
                monitors,
                ..MonitorState::default()
            })),
        }
    }

    pub async fn start(&self) -> SocketAddr {
        let router = Router::new()
            .route("/monitor", get(list_monitors).post(add_streams))
            .with_state(self.clone());
        serve(router).await
    }

    pub fn posted_urls(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .posts
            .iter()
            .flat_map(|body| body["streams"].as_array().cloned().unwrap_or_default())
            .filter_map(|url| url.as_str().map(str::to_string))
            .collect()
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", TOKEN))
        .unwrap_or(false)
}

async fn list_monitors(State(fake): State<FakeMonitor>, headers: HeaderMap) -> Response {
    let delay = fake.state.lock().unwrap().list_delay;
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let mut state = fake.state.lock().unwrap();
    if !authorized(&headers) {
        state.unauthorized_requests += 1;
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if let Some(status) = state.list_status {
        return (status, "monitor exploded").into_response();
    }
    Json(state.monitors.clone()).into_response()
}

async fn add_streams(
    State(fake): State<FakeMonitor>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = fake.state.lock().unwrap();
    if !authorized(&headers) {
        state.unauthorized_requests += 1;
        return StatusCode::UNAUTHORIZED.into_response();
    }

    state.post_content_types.push(
        headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    );
    state.posts.push(body.clone());

    let url = body["streams"][0].as_str().unwrap_or_default().to_string();
    if state.rejected_urls.contains(&url) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    // Accept by opening a new monitor for the stream
    let monitor_id = format!("m{}", state.posts.len() + 100);
    if let Some(monitors) = state.monitors.as_object_mut() {
        monitors.insert(monitor_id, monitor_entry(&[("new", url.as_str())]));
    }

    StatusCode::CREATED.into_response()
}
