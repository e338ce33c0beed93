use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, patch, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::admin;
use super::claims;
use super::health;
use super::middleware::{logging_middleware, metrics_middleware};
use super::state::AppState;
use crate::infrastructure::observability::{create_metrics_router, PrometheusMetrics};

/// Headroom for multipart framing on top of the largest document limit
const MULTIPART_OVERHEAD: u64 = 1024 * 1024;

/// Create the full router with application state
pub fn create_router_with_state(state: AppState, metrics: Option<PrometheusMetrics>) -> Router {
    let limits = state.claims.validator().limits();
    let upload_limit = [
        limits.png_bytes,
        limits.jpeg_bytes,
        limits.pdf_bytes,
        limits.text_bytes,
    ]
    .into_iter()
    .max()
    .unwrap_or_default()
        + MULTIPART_OVERHEAD;

    let router = Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route(
            "/upload",
            post(claims::upload_claim)
                .layer(DefaultBodyLimit::max(usize::try_from(upload_limit).unwrap_or(usize::MAX))),
        )
        .route("/claims", post(claims::create_claim).get(claims::list_claims))
        .route("/claims/search", get(claims::search_claims))
        .route(
            "/claims/{id}",
            get(claims::get_claim).delete(claims::delete_claim),
        )
        .route("/claims/{id}/status", patch(claims::update_claim_status))
        .route("/download/{id}", get(claims::download_document))
        .route("/analyze/{id}", post(claims::analyze_claim))
        .nest("/admin", admin::create_admin_router())
        .with_state(state);

    let router = match metrics {
        Some(metrics) => router.merge(create_metrics_router(metrics)),
        None => router,
    };

    router
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
}
