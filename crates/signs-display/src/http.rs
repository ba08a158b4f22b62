//! Local status API.
//!
//! `GET /api/state` returns the latest [`StatusSnapshot`]; `/api/refresh`
//! asks the event loop for an immediate schedule and sponsor fetch.

use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::app::AppMessage;
use crate::app_state::StatusSnapshot;

#[derive(Clone)]
pub struct HttpState {
    pub status: watch::Receiver<StatusSnapshot>,
    pub tx: mpsc::Sender<AppMessage>,
}

pub fn router(state: HttpState) -> Router {
    Router::new()
        .route("/api/state", get(get_state))
        .route("/api/refresh", get(refresh).post(refresh))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub fn start_server(
    bind_address: String,
    port: u16,
    state: HttpState,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let app = router(state);

        let addr = format!("{}:{}", bind_address, port);
        let listener = match TcpListener::bind(&addr).await {
            Ok(l) => l,
            Err(e) => {
                error!("Failed to bind HTTP server to {}: {}", addr, e);
                return;
            }
        };

        info!("status API listening on http://{}", addr);

        let shutdown = async move { cancel.cancelled().await };
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
        {
            error!("HTTP server error: {}", e);
        }
    })
}

async fn get_state(State(state): State<HttpState>) -> Json<StatusSnapshot> {
    Json(state.status.borrow().clone())
}

async fn refresh(State(state): State<HttpState>) -> StatusCode {
    info!("HTTP API: refresh");
    if state.tx.send(AppMessage::RefreshRequested).await.is_err() {
        error!("Failed to forward refresh request");
        return StatusCode::SERVICE_UNAVAILABLE;
    }
    StatusCode::ACCEPTED
}
