#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;
use signs_proto::config::ServerConfig;
use signs_proto::fetch::ScheduleClient;

/// Shared knobs for the in-process schedule server.
#[derive(Clone, Default)]
pub struct MockState {
    pub schedule: Arc<std::sync::Mutex<Value>>,
    pub sponsors: Arc<std::sync::Mutex<Value>>,
    pub failing: Arc<AtomicBool>,
    pub hits: Arc<AtomicUsize>,
}

impl MockState {
    pub fn new(schedule: Value, sponsors: Value) -> Self {
        Self {
            schedule: Arc::new(std::sync::Mutex::new(schedule)),
            sponsors: Arc::new(std::sync::Mutex::new(sponsors)),
            ..Self::default()
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_schedule(&self, schedule: Value) {
        *self.schedule.lock().unwrap() = schedule;
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

async fn schedule(State(state): State<MockState>) -> Result<Json<Value>, StatusCode> {
    state.hits.fetch_add(1, Ordering::SeqCst);
    if state.failing.load(Ordering::SeqCst) {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    Ok(Json(state.schedule.lock().unwrap().clone()))
}

async fn sponsors(State(state): State<MockState>) -> Result<Json<Value>, StatusCode> {
    if state.failing.load(Ordering::SeqCst) {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    Ok(Json(state.sponsors.lock().unwrap().clone()))
}

/// Server exposing the current endpoint paths.
pub fn current_routes(state: MockState) -> Router {
    Router::new()
        .route("/schedule", get(schedule))
        .route("/sponsors/all", get(sponsors))
        .route("/sponsors/images/present.png", get(|| async { "png" }))
        .with_state(state)
}

/// Server that only knows the legacy `/api/...` paths.
pub fn legacy_routes(state: MockState) -> Router {
    Router::new()
        .route("/api/schedule", get(schedule))
        .route("/api/sponsors", get(sponsors))
        .with_state(state)
}

/// Bind on an ephemeral port and serve `app` in the background.
pub async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

pub fn client_for(base_url: &str) -> ScheduleClient {
    ScheduleClient::new(ServerConfig {
        base_url: base_url.to_string(),
        request_timeout_secs: 5,
        ..ServerConfig::default()
    })
    .unwrap()
}
