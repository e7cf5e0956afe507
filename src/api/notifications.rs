use axum::{
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
    response::IntoResponse,
    Json,
};
use futures::stream;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::{ApiResponse, Viewer};
use crate::app_state::AppState;
use crate::error::AppResult;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub unread_only: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadRequest {
    pub notification_ids: Option<Vec<Uuid>>,
}

pub async fn list_notifications(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Query(query): Query<NotificationQuery>,
) -> AppResult<impl IntoResponse> {
    let unread_only = query.unread_only.as_deref() == Some("true");
    let page = state
        .hub
        .list(
            viewer,
            query.page.unwrap_or(1).max(1),
            query.limit.unwrap_or(20).clamp(1, 100),
            unread_only,
        )
        .await;
    Ok(ApiResponse::ok(page))
}

pub async fn mark_read(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Json(request): Json<MarkReadRequest>,
) -> AppResult<impl IntoResponse> {
    let ids = request
        .notification_ids
        .as_ref()
        .filter(|ids| !ids.is_empty())
        .map(Vec::as_slice);
    let unread_count = state.hub.mark_read(viewer, ids).await;
    Ok(ApiResponse::with_message(
        "Notifications marked as read",
        serde_json::json!({ "unreadCount": unread_count }),
    ))
}

pub async fn delete_notification(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Path(notification_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    state.hub.delete(viewer, notification_id).await?;
    Ok(ApiResponse::message_only("Notification deleted"))
}

pub async fn notification_stats(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
) -> AppResult<impl IntoResponse> {
    let stats = state.hub.stats(viewer).await;
    Ok(ApiResponse::ok(stats))
}

/// Live delivery: one SSE event per notification published while the
/// connection is open. The inbox keeps a copy regardless, so a client that
/// reconnects can catch up from the listing endpoint.
pub async fn stream(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
) -> AppResult<impl IntoResponse> {
    let receiver = state.hub.subscribe(viewer).await;

    let events = stream::unfold(receiver, |mut receiver| async move {
        let notification = receiver.recv().await?;
        Some((
            Event::default()
                .event("notification")
                .json_data(&notification),
            receiver,
        ))
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
