pub mod auth;
pub mod clients;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use cadastro_api::ApiError;

/// Build an error response with the standard `ApiError` body
pub(crate) fn error_response(
    status: StatusCode,
    error: &str,
    message: impl Into<String>,
) -> Response {
    (status, Json(ApiError::new(error, message))).into_response()
}

pub(crate) fn internal_error(err: impl std::fmt::Display) -> Response {
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        err.to_string(),
    )
}
