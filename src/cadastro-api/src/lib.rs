//! Wire types for the Cadastro Admin API
//!
//! Shared by the server, the SDK, and the CLI so the request/response
//! contract lives in exactly one place.

pub mod types;

pub use types::auth::{LoginRequest, TokenResponse, UserResponse};
pub use types::clients::{
    ClientResponse, ClientSearchFilters, CreateClientRequest, PaginatedClientsResponse,
    UpdateClientRequest,
};
pub use types::error::ApiError;
pub use types::export::{ExportFormat, ExportRequest};
