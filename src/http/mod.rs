//! HTTP liveness surface
//!
//! `GET /` answers uptime monitors with a static string; `GET /health`
//! exposes a read-only snapshot of the presence set size and the
//! restart-in-progress flag.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::state::BotState;

/// Health snapshot response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Always `"ok"` while the process answers at all
    pub status: &'static str,

    /// Seconds since process start
    pub uptime: u64,

    /// Size of the presence set
    pub online_players: usize,

    /// Whether a restart sequence currently holds the flag
    pub restart_in_progress: bool,
}

async fn index() -> &'static str {
    "🤖 palisade is running!"
}

async fn health(State(state): State<Arc<BotState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime: state.start_time.elapsed().as_secs(),
        online_players: state.presence.online_count().await,
        restart_in_progress: state.restart_flag.is_set(),
    })
}

/// Build the liveness router
pub fn build_router(state: Arc<BotState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the liveness endpoints until the shutdown future resolves
pub async fn serve(
    state: Arc<BotState>,
    port: u16,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let router = build_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "liveness endpoint listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("liveness endpoint stopped");
    Ok(())
}
