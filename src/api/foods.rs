use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::{ApiResponse, Viewer};
use crate::app_state::AppState;
use crate::error::AppResult;
use crate::foods::CreateFoodRequest;

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageQuery {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(20).clamp(1, 100)
    }
}

pub async fn create_food(
    State(state): State<AppState>,
    Viewer(partner_id): Viewer,
    Json(request): Json<CreateFoodRequest>,
) -> AppResult<impl IntoResponse> {
    let food = state.foods.create(partner_id, request).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message("Food created successfully", food),
    ))
}

pub async fn list_foods(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<impl IntoResponse> {
    let page = state.foods.list(query.page(), query.limit()).await?;
    Ok(ApiResponse::ok(page))
}

pub async fn get_food(
    State(state): State<AppState>,
    Path(food_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let food = state.foods.get(food_id).await?;
    Ok(ApiResponse::ok(food))
}

pub async fn delete_food(
    State(state): State<AppState>,
    Viewer(partner_id): Viewer,
    Path(food_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    state.foods.delete(partner_id, food_id).await?;
    Ok(ApiResponse::message_only("Food deleted successfully"))
}

pub async fn like_food(
    State(state): State<AppState>,
    Viewer(user_id): Viewer,
    Path(food_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let result = state.foods.toggle_like(user_id, food_id).await?;
    let message = if result.liked {
        "Food liked successfully"
    } else {
        "Food unliked successfully"
    };
    Ok(ApiResponse::with_message(message, result))
}

pub async fn save_food(
    State(state): State<AppState>,
    Viewer(user_id): Viewer,
    Path(food_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let result = state.foods.toggle_save(user_id, food_id).await?;
    let message = if result.saved {
        "Food saved successfully"
    } else {
        "Food unsaved successfully"
    };
    Ok(ApiResponse::with_message(message, result))
}

pub async fn view_food(
    State(state): State<AppState>,
    Path(food_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let view_count = state.foods.record_view(food_id).await?;
    Ok(ApiResponse::ok(serde_json::json!({ "viewCount": view_count })))
}

pub async fn saved_foods(
    State(state): State<AppState>,
    Viewer(user_id): Viewer,
    Query(query): Query<PageQuery>,
) -> AppResult<impl IntoResponse> {
    let page = state
        .foods
        .saved(user_id, query.page(), query.limit())
        .await?;
    Ok(ApiResponse::ok(page))
}
