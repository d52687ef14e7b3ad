/// Errors surfaced by [`crate::CadastroClient`] operations
#[derive(Debug, thiserror::Error)]
pub enum SdkError {
    /// The request never produced a usable response (connection refused,
    /// timeout, TLS failure)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// The server answered with an error status; `message` carries the
    /// `ApiError` body when one was present
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    /// A success response carried a body the expected type could not be
    /// parsed from
    #[error("Deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),
}
