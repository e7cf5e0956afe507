use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::api::foods::PageQuery;
use crate::api::{ApiResponse, Viewer};
use crate::app_state::AppState;
use crate::comments::{CreateCommentRequest, UpdateCommentRequest};
use crate::error::AppResult;

pub async fn create_comment(
    State(state): State<AppState>,
    Viewer(user_id): Viewer,
    Json(request): Json<CreateCommentRequest>,
) -> AppResult<impl IntoResponse> {
    let comment = state.comments.create(user_id, request).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message("Comment created successfully", comment),
    ))
}

pub async fn food_comments(
    State(state): State<AppState>,
    Path(food_id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> AppResult<impl IntoResponse> {
    let page = state
        .comments
        .for_food(food_id, query.page(), query.limit())
        .await?;
    Ok(ApiResponse::ok(page))
}

pub async fn update_comment(
    State(state): State<AppState>,
    Viewer(user_id): Viewer,
    Path(comment_id): Path<Uuid>,
    Json(request): Json<UpdateCommentRequest>,
) -> AppResult<impl IntoResponse> {
    let comment = state.comments.update(user_id, comment_id, request).await?;
    Ok(ApiResponse::with_message(
        "Comment updated successfully",
        comment,
    ))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Viewer(user_id): Viewer,
    Path(comment_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    state.comments.delete(user_id, comment_id).await?;
    Ok(ApiResponse::message_only("Comment deleted successfully"))
}

pub async fn like_comment(
    State(state): State<AppState>,
    Viewer(user_id): Viewer,
    Path(comment_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let result = state.comments.toggle_like(user_id, comment_id).await?;
    let message = if result.liked {
        "Comment liked successfully"
    } else {
        "Comment unliked successfully"
    };
    Ok(ApiResponse::with_message(message, result))
}
