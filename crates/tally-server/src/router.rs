use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handler;
use crate::server::AppState;

/// Build the axum router with all tally endpoints.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/records", post(handler::append))
        .route("/v1/records/name-only", post(handler::append_name_only))
        .route("/v1/records/sum-of-two", post(handler::append_sum_of_two))
        .route("/v1/records/:id", get(handler::record))
        .route("/v1/count", get(handler::count))
        .route("/v1/history", get(handler::history))
        .route("/v1/refresh", post(handler::refresh))
        .route("/v1/health", get(handler::health))
        .route("/v1/info", get(handler::info))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
