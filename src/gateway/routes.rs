// src/gateway/routes.rs
//! HTTP transport for the command surface
//!
//! Thin axum wiring over [`Gateway`]: every handler deserializes its
//! input, calls the matching gateway operation, and wraps the outcome in a
//! `{success, data?, message?, error?}` envelope. Caller mistakes map to
//! 400, supervisor-side failures to 500; nothing escapes as a panic.

use crate::gateway::api::Gateway;
use crate::types::MiningRequest;
use crate::utils::error::SupervisorError;
use axum::{
    Router,
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;

/// Builds the HTTP router for the command surface
///
/// Routes mirror the original local API:
/// - `GET  /api/status` - current status snapshot
/// - `POST /api/start` - start mining
/// - `POST /api/stop` - stop mining
/// - `POST /api/config/pool` - change the default pool
/// - `GET  /api/system` - host machine facts
/// - `GET  /api/check` - probe the miner binary
///
/// CORS is fully permissive; the expected callers are browser extensions
/// talking to localhost.
pub fn router(gateway: Gateway) -> Router {
    Router::new()
        .route("/api/status", get(handle_status))
        .route("/api/start", post(handle_start))
        .route("/api/stop", post(handle_stop))
        .route("/api/config/pool", post(handle_set_pool))
        .route("/api/system", get(handle_system))
        .route("/api/check", get(handle_check))
        .layer(CorsLayer::permissive())
        .with_state(gateway)
}

/// Body of a pool-change request
#[derive(Debug, Deserialize)]
struct PoolUpdate {
    pool: String,
}

/// Wraps a payload in a success envelope
fn success<T: Serialize>(data: T) -> Response {
    axum::Json(json!({ "success": true, "data": data })).into_response()
}

/// Wraps a payload and a human-readable note in a success envelope
fn success_with_message<T: Serialize>(data: T, message: &str) -> Response {
    axum::Json(json!({ "success": true, "message": message, "data": data })).into_response()
}

/// Maps an operation failure to a status code and a failure envelope
fn failure(err: &SupervisorError) -> Response {
    let code = if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (
        code,
        axum::Json(json!({ "success": false, "error": err.to_string() })),
    )
        .into_response()
}

async fn handle_status(State(gateway): State<Gateway>) -> Response {
    success(gateway.status())
}

async fn handle_start(
    State(gateway): State<Gateway>,
    Json(request): Json<MiningRequest>,
) -> Response {
    match gateway.start(request).await {
        Ok(status) => success_with_message(status, "Mining started"),
        Err(e) => failure(&e),
    }
}

async fn handle_stop(State(gateway): State<Gateway>) -> Response {
    match gateway.stop().await {
        Ok(()) => {
            axum::Json(json!({ "success": true, "message": "Mining stopped" })).into_response()
        }
        Err(e) => failure(&e),
    }
}

async fn handle_set_pool(
    State(gateway): State<Gateway>,
    Json(update): Json<PoolUpdate>,
) -> Response {
    match gateway.set_pool(&update.pool).await {
        Ok(pool) => {
            axum::Json(json!({ "success": true, "message": "Pool configured", "pool": pool }))
                .into_response()
        }
        Err(e) => failure(&e),
    }
}

async fn handle_system(State(gateway): State<Gateway>) -> Response {
    success(gateway.system_info())
}

async fn handle_check(State(gateway): State<Gateway>) -> Response {
    match gateway.check().await {
        Ok(version) => {
            axum::Json(json!({ "success": true, "version": version })).into_response()
        }
        Err(e) => failure(&e),
    }
}
