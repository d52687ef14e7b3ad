pub mod auth;
pub mod clients;
pub mod error;
pub mod export;
