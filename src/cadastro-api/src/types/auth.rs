use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for obtaining an access token
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Operator email
    pub email: String,
    /// Operator password
    pub password: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Access token issued on successful login
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// The bearer token
    pub access_token: String,
    /// Token type, always `bearer`
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

impl TokenResponse {
    pub fn new(access_token: String) -> Self {
        Self {
            access_token,
            token_type: default_token_type(),
        }
    }
}

/// Operator account information
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    /// Account id
    pub id: i64,
    /// Account email
    pub email: String,
    /// Display name
    pub full_name: String,
    /// Whether the account may log in
    pub is_active: bool,
    /// Whether the account has admin rights
    pub is_admin: bool,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}
