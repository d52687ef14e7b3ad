//! HTTP authentication middleware for Axum
//!
//! Extracts the bearer token from the Authorization header, validates it
//! against the user store, and inserts [`CurrentUser`] into request
//! extensions on success.

use super::{AuthError, Authenticator, CurrentUser};
use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// Extract the bearer token from an HTTP request. A missing header is a
/// 401: unauthenticated clients send the request through and fail here.
fn extract_bearer_token(headers: &HeaderMap) -> Result<String, AuthError> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| AuthError::unauthorized("Missing Authorization header"))?
        .to_str()
        .map_err(|_| AuthError::bad_request("Invalid Authorization header"))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::bad_request("Authorization header must use Bearer scheme"))?
        .to_string();

    Ok(token)
}

/// Axum middleware function for HTTP authentication
///
/// Returns the appropriate HTTP error response (400/401/403) as an
/// `ApiError`-shaped JSON body on auth failure.
pub async fn auth_middleware(
    authenticator: Arc<Authenticator>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match extract_bearer_token(request.headers()) {
        Ok(token) => token,
        Err(err) => return auth_error_response(err),
    };

    let current_user = match authenticator.authenticate(&token).await {
        Ok(user) => user,
        Err(err) => {
            log::warn!("Authentication failed: {}", err.message);
            return auth_error_response(err);
        }
    };

    log::debug!(
        "Authenticated request for user '{}' (id {})",
        current_user.email,
        current_user.id
    );

    request.extensions_mut().insert(current_user);

    next.run(request).await
}

fn auth_error_response(err: AuthError) -> Response {
    let status = StatusCode::from_u16(err.status_code).unwrap_or(StatusCode::UNAUTHORIZED);
    let body = serde_json::json!({
        "error": "authentication_error",
        "message": err.message,
    });
    (status, axum::Json(body)).into_response()
}

/// Axum extractor for the authenticated user from request extensions
///
/// Use this in handler functions behind the auth middleware:
///
/// ```ignore
/// async fn handler(CurrentUserExtractor(user): CurrentUserExtractor) -> Response {
///     // ... use user.id / user.email
/// }
/// ```
pub struct CurrentUserExtractor(pub CurrentUser);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentUserExtractor
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .map(CurrentUserExtractor)
            .ok_or_else(|| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CurrentUser not found in request extensions".to_string(),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_bearer_token_success() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc.def"));

        let token = extract_bearer_token(&headers).unwrap();
        assert_eq!(token, "abc.def");
    }

    #[test]
    fn test_extract_bearer_token_missing_header() {
        let headers = HeaderMap::new();

        let err = extract_bearer_token(&headers).unwrap_err();
        assert_eq!(err.status_code, 401);
        assert!(err.message.contains("Missing Authorization"));
    }

    #[test]
    fn test_extract_bearer_token_wrong_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Basic dXNlcg=="));

        let err = extract_bearer_token(&headers).unwrap_err();
        assert_eq!(err.status_code, 400);
        assert!(err.message.contains("Bearer"));
    }
}
