use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::api::foods::PageQuery;
use crate::api::{ApiResponse, Viewer};
use crate::app_state::AppState;
use crate::error::AppResult;
use crate::social::PreferencesUpdate;

pub async fn follow_partner(
    State(state): State<AppState>,
    Viewer(user_id): Viewer,
    Path(partner_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let result = state.social.follow(user_id, partner_id).await?;
    Ok(ApiResponse::with_message(
        "Successfully followed partner",
        result,
    ))
}

pub async fn unfollow_partner(
    State(state): State<AppState>,
    Viewer(user_id): Viewer,
    Path(partner_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let result = state.social.unfollow(user_id, partner_id).await?;
    Ok(ApiResponse::with_message(
        "Successfully unfollowed partner",
        result,
    ))
}

pub async fn follow_status(
    State(state): State<AppState>,
    Viewer(user_id): Viewer,
    Path(partner_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let status = state.social.follow_status(user_id, partner_id).await?;
    Ok(ApiResponse::ok(status))
}

pub async fn user_following(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> AppResult<impl IntoResponse> {
    let page = state
        .social
        .following(user_id, query.page(), query.limit())
        .await?;
    Ok(ApiResponse::ok(page))
}

pub async fn partner_followers(
    State(state): State<AppState>,
    Path(partner_id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> AppResult<impl IntoResponse> {
    let page = state
        .social
        .followers(partner_id, query.page(), query.limit())
        .await?;
    Ok(ApiResponse::ok(page))
}

pub async fn user_stats(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let stats = state.social.stats(user_id).await?;
    Ok(ApiResponse::ok(stats))
}

pub async fn update_preferences(
    State(state): State<AppState>,
    Viewer(user_id): Viewer,
    Json(update): Json<PreferencesUpdate>,
) -> AppResult<impl IntoResponse> {
    let preferences = state.social.update_preferences(user_id, update).await?;
    Ok(ApiResponse::with_message(
        "Preferences updated successfully",
        preferences,
    ))
}
