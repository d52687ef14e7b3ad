use crate::format;
use anyhow::{Context, Result};
use cadastro_sdk::CadastroClient;

/// Fetch and render one client record. Failures surface as a generic
/// error and a nonzero exit.
pub async fn run(client: &CadastroClient, id: i64) -> Result<()> {
    let record = client
        .get_client(id)
        .await
        .context("Failed to load client details")?;

    print!("{}", format::client_details(&record));
    Ok(())
}
