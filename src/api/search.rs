use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};

use crate::api::{ApiResponse, CachedResponse};
use crate::app_state::AppState;
use crate::error::AppResult;
use crate::search::{FoodSearchParams, PartnerSearchParams, SuggestionParams};

pub async fn search_foods(
    State(state): State<AppState>,
    Query(params): Query<FoodSearchParams>,
) -> AppResult<impl IntoResponse> {
    let (result, cached) = state.search.search_foods(params).await?;
    Ok(Json(CachedResponse {
        success: true,
        data: result,
        cached,
    }))
}

pub async fn search_partners(
    State(state): State<AppState>,
    Query(params): Query<PartnerSearchParams>,
) -> AppResult<impl IntoResponse> {
    let (result, cached) = state.search.search_partners(params).await?;
    Ok(Json(CachedResponse {
        success: true,
        data: result,
        cached,
    }))
}

pub async fn suggestions(
    State(state): State<AppState>,
    Query(params): Query<SuggestionParams>,
) -> AppResult<impl IntoResponse> {
    let list = state.search.suggestions(params).await?;
    Ok(ApiResponse::ok(list))
}
