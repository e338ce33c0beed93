//! Admin endpoints

use axum::{extract::State, routing::get, Router};
use serde::Serialize;
use tracing::debug;

use super::middleware::RequireApiKey;
use super::state::AppState;
use super::types::{ApiError, Json};
use crate::domain::admission::BlockEvent;

#[derive(Debug, Serialize)]
pub struct BlockLogResponse {
    pub recent_blocked_attempts: Vec<BlockEvent>,
}

pub fn create_admin_router() -> Router<AppState> {
    Router::new().route("/rate-limit/logs", get(rate_limit_logs))
}

/// GET /admin/rate-limit/logs
///
/// Oldest first. Restricted to the admin key when one is configured.
pub async fn rate_limit_logs(
    State(state): State<AppState>,
    RequireApiKey(key): RequireApiKey,
) -> Result<Json<BlockLogResponse>, ApiError> {
    if !state.auth.is_admin(&key) {
        return Err(ApiError::forbidden("Not authorized to view block logs"));
    }

    let recent_blocked_attempts = state.admission.block_log().await;
    debug!(entries = recent_blocked_attempts.len(), "Block log read");

    Ok(Json(BlockLogResponse {
        recent_blocked_attempts,
    }))
}
