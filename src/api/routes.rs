use axum::{
    Router,
    routing::{get, post, put},
};
use std::sync::Arc;

use crate::session::SessionService;
use crate::stream::SimulatedEmitter;

use super::handlers;

pub type SharedSession = Arc<SessionService<SimulatedEmitter>>;

pub fn create_router(service: SharedSession) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Session snapshot
        .route("/api/v1/session", get(handlers::get_session))
        // Main flow
        .route(
            "/api/v1/session/messages",
            get(handlers::get_main_messages)
                .put(handlers::update_main_messages)
                .post(handlers::send_main_message),
        )
        .route(
            "/api/v1/session/messages/{message_id}",
            get(handlers::get_message),
        )
        // Branches
        .route(
            "/api/v1/session/branches",
            post(handlers::create_branch).get(handlers::get_branches),
        )
        .route(
            "/api/v1/session/branches/{branch_id}",
            get(handlers::get_branch),
        )
        .route(
            "/api/v1/session/branches/{branch_id}/open",
            post(handlers::open_branch),
        )
        // Active branch
        .route("/api/v1/session/branch/close", post(handlers::close_branch))
        .route("/api/v1/session/branch/merge", post(handlers::merge_branch))
        .route(
            "/api/v1/session/branch/messages",
            put(handlers::update_branch_messages).post(handlers::send_branch_message),
        )
        .with_state(service)
}

async fn health_check() -> axum::Json<crate::api::dto::HealthResponse> {
    axum::Json(crate::api::dto::HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now(),
    })
}
