use axum::extract::{Extension, Path, State};

use crate::api::request::{CreateParticipantRequest, UpdateParticipantRequest};
use crate::api::response::{MessageResponse, ParticipantListResponse, ParticipantResponse};
use crate::api::{ApiResponse, ApiResult, JsonBody};
use crate::app::AppState;
use crate::database::repository::PARTICIPANT_NOT_FOUND;
use crate::handlers::parse_path_id;
use crate::middleware::AuthUser;

/// GET /api/participants - events the caller has joined
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<ParticipantListResponse> {
    let participants = state.participants.list(auth.user_id).await?;
    Ok(ApiResponse::success(ParticipantListResponse { participants }))
}

/// POST /api/participants - `{"event_id"}`; any user may join any event
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    JsonBody(payload): JsonBody<CreateParticipantRequest>,
) -> ApiResult<ParticipantResponse> {
    let participant = state.participants.create(auth.user_id, payload).await?;
    Ok(ApiResponse::created(ParticipantResponse {
        message: "Joined event successfully",
        participant,
    }))
}

/// PUT /api/participants/:id - `{"event_id"?}` moves the row to another event
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<UpdateParticipantRequest>,
) -> ApiResult<ParticipantResponse> {
    let participant_id = parse_path_id(&id, PARTICIPANT_NOT_FOUND)?;
    let participant = state.participants.update(auth.user_id, participant_id, payload).await?;
    Ok(ApiResponse::success(ParticipantResponse {
        message: "Participation updated successfully",
        participant,
    }))
}

/// DELETE /api/participants/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<MessageResponse> {
    let participant_id = parse_path_id(&id, PARTICIPANT_NOT_FOUND)?;
    state.participants.delete(auth.user_id, participant_id).await?;
    Ok(ApiResponse::success(MessageResponse {
        message: "Left event successfully",
    }))
}
