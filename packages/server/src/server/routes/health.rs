//! Liveness endpoint: a cheap database round trip plus pool occupancy.

use std::time::Duration;

use axum::{extract::Extension, http::StatusCode, Json};
use serde::Serialize;

use crate::server::app::AppState;

const DB_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    database: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    pool: PoolStatus,
}

#[derive(Serialize)]
pub struct PoolStatus {
    connections: u32,
    idle: usize,
}

/// GET /health
///
/// 200 when the database answers within the probe timeout, 503 otherwise.
pub async fn health_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let probe = tokio::time::timeout(
        DB_PROBE_TIMEOUT,
        sqlx::query("SELECT 1").execute(&state.db_pool),
    )
    .await;

    let error = match probe {
        Ok(Ok(_)) => None,
        Ok(Err(e)) => Some(format!("query failed: {e}")),
        Err(_) => Some(format!("no answer within {:?}", DB_PROBE_TIMEOUT)),
    };

    let pool = PoolStatus {
        connections: state.db_pool.size(),
        idle: state.db_pool.num_idle(),
    };

    let healthy = error.is_none();
    let response = HealthResponse {
        status: if healthy { "healthy" } else { "unhealthy" },
        database: if healthy { "ok" } else { "error" },
        error,
        pool,
    };

    let code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(response))
}
