//! Health check endpoint handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::app::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub storage: StorageHealth,
    pub assistant_configured: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageHealth {
    pub backend: String,
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

/// Simple status response for liveness/readiness probes.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

/// Pings the database when there is one. Memory storage is always reachable.
async fn check_storage(state: &AppState) -> StorageHealth {
    match &state.pool {
        Some(pool) => {
            let start = std::time::Instant::now();
            let connected = match persistence::db::ping(pool).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(error = %e, "Database ping failed");
                    false
                }
            };
            persistence::metrics::record_pool_metrics(pool);
            StorageHealth {
                backend: "postgres".to_string(),
                connected,
                latency_ms: connected.then(|| start.elapsed().as_millis() as u64),
            }
        }
        None => StorageHealth {
            backend: "memory".to_string(),
            connected: true,
            latency_ms: None,
        },
    }
}

pub async fn health_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let storage = check_storage(&state).await;
    let status = if storage.connected {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = HealthResponse {
        status: if storage.connected { "healthy" } else { "unhealthy" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage,
        assistant_configured: !state.config.assistant.api_key.trim().is_empty(),
    };

    (status, Json(response))
}

/// Liveness probe: the process is running.
pub async fn live() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "alive".to_string(),
    })
}

/// Readiness probe: storage can take traffic.
pub async fn ready(State(state): State<AppState>) -> Result<Json<StatusResponse>, StatusCode> {
    if check_storage(&state).await.connected {
        Ok(Json(StatusResponse {
            status: "ready".to_string(),
        }))
    } else {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}
