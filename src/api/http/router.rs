// src/api/http/router.rs

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

use super::assistant;

/// Routes for the assistant, mounted under /api/v1/assistant.
fn assistant_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/chat", post(assistant::chat))
        .route(
            "/conversations",
            get(assistant::list_conversations).delete(assistant::clear_conversations),
        )
        .route(
            "/conversations/{id}",
            get(assistant::get_conversation)
                .patch(assistant::update_conversation)
                .delete(assistant::delete_conversation),
        )
        .route("/conversations/{id}/messages", get(assistant::list_messages))
        .route("/summary", get(assistant::summary))
        .route("/learning-path", get(assistant::learning_path))
        .route("/review-reminder", get(assistant::review_reminder))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api/v1/assistant", assistant_router())
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(120)))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
