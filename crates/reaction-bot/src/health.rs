//! Health check endpoints
//!
//! `/live` answers as soon as the process is up, `/ready` only once the
//! gateway session is established, and `/health` reports both.

use std::sync::Arc;
use std::time::SystemTime;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use serenity::prelude::TypeMapKey;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub bot_username: Option<String>,
    pub gateway_ready: bool,
    pub uptime_secs: u64,
}

/// Shared state between the gateway handler and the health server.
#[derive(Clone)]
pub struct AppState {
    pub start_time: SystemTime,
    /// Set by the `ready` event.
    pub bot_username: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            start_time: SystemTime::now(),
            bot_username: Arc::new(RwLock::new(None)),
        }
    }

    pub async fn set_bot_username(&self, username: String) {
        *self.bot_username.write().await = Some(username);
    }

    async fn status(&self) -> HealthStatus {
        let bot_username = self.bot_username.read().await.clone();
        HealthStatus {
            status: "ok".to_string(),
            gateway_ready: bot_username.is_some(),
            bot_username,
            uptime_secs: self.start_time.elapsed().unwrap_or_default().as_secs(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeMapKey for AppState {
    type Value = AppState;
}

async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    (StatusCode::OK, Json(state.status().await))
}

async fn ready_handler(State(state): State<AppState>) -> StatusCode {
    if state.bot_username.read().await.is_some() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn live_handler() -> StatusCode {
    StatusCode::OK
}

pub fn create_health_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/live", get(live_handler))
        .with_state(state)
}

/// Serve the health endpoints until the listener fails.
pub async fn start_health_server(state: AppState, port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Health check server listening on {}", addr);
    axum::serve(listener, create_health_router(state)).await?;
    Ok(())
}
