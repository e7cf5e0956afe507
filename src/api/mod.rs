// HTTP surface: route wiring plus the response envelope shared by every
// handler. Handlers live in one module per resource.

pub mod accounts;
pub mod comments;
pub mod foods;
pub mod notifications;
pub mod search;
pub mod social;
pub mod viewer;

use axum::{
    response::{IntoResponse, Json},
    routing::{delete, get, post, put},
    Router,
};
use serde::Serialize;

use crate::app_state::AppState;
use crate::models::current_time_millis;

pub use viewer::Viewer;

/// Standard response envelope: `{success, message?, data?}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: None,
            data: Some(data),
        })
    }

    pub fn with_message(message: &str, data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: Some(message.to_string()),
            data: Some(data),
        })
    }
}

impl ApiResponse<()> {
    pub fn message_only(message: &str) -> Json<Self> {
        Json(Self {
            success: true,
            message: Some(message.to_string()),
            data: None,
        })
    }
}

/// Search endpoints add a top-level `cached` flag to the envelope.
#[derive(Debug, Serialize)]
pub struct CachedResponse<T> {
    pub success: bool,
    pub data: T,
    pub cached: bool,
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "reeldine",
        "timestamp": current_time_millis()
    }))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        // Profiles
        .route("/api/users", post(accounts::create_user))
        .route("/api/users/{id}", get(accounts::get_user))
        .route("/api/partners", post(accounts::create_partner))
        .route("/api/partners/{id}", get(accounts::get_partner))
        // Food posts
        .route("/api/food", post(foods::create_food).get(foods::list_foods))
        .route("/api/food/saved", get(foods::saved_foods))
        .route(
            "/api/food/{id}",
            get(foods::get_food).delete(foods::delete_food),
        )
        .route("/api/food/{id}/like", post(foods::like_food))
        .route("/api/food/{id}/save", post(foods::save_food))
        .route("/api/food/{id}/view", post(foods::view_food))
        // Comments
        .route("/api/comments", post(comments::create_comment))
        .route("/api/comments/food/{foodId}", get(comments::food_comments))
        .route(
            "/api/comments/{id}",
            put(comments::update_comment).delete(comments::delete_comment),
        )
        .route("/api/comments/{id}/like", post(comments::like_comment))
        // Search
        .route("/api/search/foods", get(search::search_foods))
        .route("/api/search/partners", get(search::search_partners))
        .route("/api/search/suggestions", get(search::suggestions))
        // Social graph
        .route(
            "/api/social/partners/{partnerId}/follow",
            post(social::follow_partner).delete(social::unfollow_partner),
        )
        .route(
            "/api/social/partners/{partnerId}/follow-status",
            get(social::follow_status),
        )
        .route(
            "/api/social/partners/{partnerId}/followers",
            get(social::partner_followers),
        )
        .route("/api/social/users/{userId}/following", get(social::user_following))
        .route("/api/social/users/{userId}/stats", get(social::user_stats))
        .route("/api/social/preferences", put(social::update_preferences))
        // Notifications
        .route("/api/notifications", get(notifications::list_notifications))
        .route("/api/notifications/read", put(notifications::mark_read))
        .route("/api/notifications/stats", get(notifications::notification_stats))
        .route("/api/notifications/stream", get(notifications::stream))
        .route(
            "/api/notifications/{id}",
            delete(notifications::delete_notification),
        )
        .with_state(state)
}
