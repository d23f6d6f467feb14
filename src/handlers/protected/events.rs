use axum::extract::{Extension, Path, State};

use crate::api::request::{CreateEventRequest, UpdateEventRequest};
use crate::api::response::{EventListResponse, EventResponse, MessageResponse};
use crate::api::{ApiResponse, ApiResult, JsonBody};
use crate::app::AppState;
use crate::database::repository::EVENT_NOT_FOUND;
use crate::handlers::parse_path_id;
use crate::middleware::AuthUser;

/// GET /api/events - the caller's own events
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<EventListResponse> {
    let events = state.events.list(auth.user_id).await?;
    Ok(ApiResponse::success(EventListResponse { events }))
}

/// POST /api/events - `{"title", "date"}`
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    JsonBody(payload): JsonBody<CreateEventRequest>,
) -> ApiResult<EventResponse> {
    let event = state.events.create(auth.user_id, payload).await?;
    Ok(ApiResponse::created(EventResponse {
        message: "Event created successfully",
        event,
    }))
}

/// PUT /api/events/:id - `{"title"?, "date"?}`
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<UpdateEventRequest>,
) -> ApiResult<EventResponse> {
    let event_id = parse_path_id(&id, EVENT_NOT_FOUND)?;
    let event = state.events.update(auth.user_id, event_id, payload).await?;
    Ok(ApiResponse::success(EventResponse {
        message: "Event updated successfully",
        event,
    }))
}

/// DELETE /api/events/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<MessageResponse> {
    let event_id = parse_path_id(&id, EVENT_NOT_FOUND)?;
    state.events.delete(auth.user_id, event_id).await?;
    Ok(ApiResponse::success(MessageResponse {
        message: "Event deleted successfully",
    }))
}
