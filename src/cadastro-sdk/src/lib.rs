mod client;
mod error;
mod records;

pub use client::CadastroClient;
pub use error::SdkError;

// Re-export API types for convenience
pub use cadastro_api;
