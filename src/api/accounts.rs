use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::accounts::{CreatePartnerRequest, CreateUserRequest};
use crate::api::ApiResponse;
use crate::app_state::AppState;
use crate::error::AppResult;

pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> AppResult<impl IntoResponse> {
    let user = state.accounts.create_user(request).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message("User created successfully", user),
    ))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let user = state.accounts.get_user(user_id).await?;
    Ok(ApiResponse::ok(user))
}

pub async fn create_partner(
    State(state): State<AppState>,
    Json(request): Json<CreatePartnerRequest>,
) -> AppResult<impl IntoResponse> {
    let partner = state.accounts.create_partner(request).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message("Food partner created successfully", partner),
    ))
}

pub async fn get_partner(
    State(state): State<AppState>,
    Path(partner_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let partner = state.accounts.get_partner(partner_id).await?;
    Ok(ApiResponse::ok(partner))
}
