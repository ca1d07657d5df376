pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::chat::handlers as chat_handlers;
use crate::plan::handlers as plan_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Plan API
        .route("/api/v1/plans", post(plan_handlers::handle_generate_plan))
        .route("/api/v1/plans/:id", get(plan_handlers::handle_get_plan))
        .route(
            "/api/v1/plans/:id/tasks/:index/complete",
            patch(plan_handlers::handle_complete_task),
        )
        // Coaching chat with structured plan mutations
        .route("/api/v1/plans/:id/chat", post(chat_handlers::handle_chat))
        .with_state(state)
}
