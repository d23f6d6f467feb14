use axum::extract::State;

use crate::api::request::{LoginRequest, RegisterRequest};
use crate::api::response::{LoginResponse, RegisterResponse};
use crate::api::{ApiResponse, ApiResult, JsonBody};
use crate::app::AppState;
use crate::database::models::UserView;

/// POST /api/register - create an account
///
/// Input: `{"email": "...", "password": "..."}` (password at least 6 characters).
/// Output: 201 `{"message", "user": {"id", "email"}}`; 400 invalid input, 409 email taken.
pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> ApiResult<RegisterResponse> {
    let user = state.credentials.register(payload).await?;

    Ok(ApiResponse::created(RegisterResponse {
        message: "User registered successfully",
        user: UserView::from(&user),
    }))
}

/// POST /api/login - exchange credentials for a 24 hour bearer token
///
/// Output: 200 `{"message", "access_token", "user"}`; 401 with the same message
/// whether the email is unknown or the password is wrong.
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let user = state.credentials.authenticate(payload).await?;
    let access_token = state.tokens.issue(user.id)?;

    Ok(ApiResponse::success(LoginResponse {
        message: "Login successful",
        access_token,
        user: UserView::from(&user),
    }))
}
