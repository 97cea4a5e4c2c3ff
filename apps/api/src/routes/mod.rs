pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::interview::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/session/restore", post(handlers::handle_restore))
        .route("/api/v1/session/mode", post(handlers::handle_select_mode))
        .route(
            "/api/v1/session/timeframe",
            post(handlers::handle_select_timeframe),
        )
        .route("/api/v1/session/turn", post(handlers::handle_submit_turn))
        .route("/api/v1/session/skip", post(handlers::handle_skip))
        .route(
            "/api/v1/session/retry-generation",
            post(handlers::handle_retry_generation),
        )
        .route("/api/v1/session/reset", post(handlers::handle_reset))
        .route("/api/v1/session/export", post(handlers::handle_export))
        .with_state(state)
}
