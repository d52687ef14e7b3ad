use super::{error_response, internal_error};
use crate::ServerState;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use cadastro_api::{ApiError, LoginRequest, TokenResponse, UserResponse};
use common::auth::CurrentUserExtractor;

/// Verify credentials and issue an access token
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Access token issued", body = TokenResponse),
        (status = 401, description = "Incorrect credentials", body = ApiError),
    )
)]
pub async fn login<S: ServerState>(
    State(state): State<S>,
    Json(request): Json<LoginRequest>,
) -> impl IntoResponse {
    match state
        .authenticator()
        .login(&request.email, &request.password)
        .await
    {
        Ok(token) => (StatusCode::OK, Json(TokenResponse::new(token))).into_response(),
        Err(err) => {
            log::warn!("Login failed for '{}': {}", request.email, err.message);
            error_response(
                StatusCode::from_u16(err.status_code).unwrap_or(StatusCode::UNAUTHORIZED),
                "authentication_error",
                err.message,
            )
        }
    }
}

/// Return the account behind the presented token
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Authenticated account", body = UserResponse),
        (status = 401, description = "Missing or invalid token", body = ApiError),
    )
)]
pub async fn me<S: ServerState>(
    State(state): State<S>,
    CurrentUserExtractor(user): CurrentUserExtractor,
) -> impl IntoResponse {
    match state.store().find_user_by_id(user.id).await {
        Ok(Some(record)) => (
            StatusCode::OK,
            Json(UserResponse {
                id: record.id,
                email: record.email,
                full_name: record.full_name,
                is_active: record.is_active,
                is_admin: record.is_admin,
                created_at: record.created_at,
            }),
        )
            .into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "not_found", "User not found"),
        Err(e) => internal_error(e),
    }
}
