use crate::format;
use anyhow::{Context, Result};
use cadastro_api::ClientSearchFilters;
use cadastro_sdk::CadastroClient;
use clap::Args;

#[derive(Args)]
pub struct SearchArgs {
    /// Filter by CPF (masked or digits, substring match)
    #[arg(long)]
    cpf: Option<String>,

    /// Filter by full name (substring match)
    #[arg(long)]
    nome: Option<String>,

    /// Filter by city (substring match)
    #[arg(long)]
    cidade: Option<String>,

    /// Filter by state code
    #[arg(long)]
    uf: Option<String>,

    /// Filter by active flag (true/false)
    #[arg(long)]
    ativo: Option<bool>,

    /// Page to fetch; a fresh search starts at page 1
    #[arg(long)]
    page: Option<u32>,

    /// Page size; the server default applies when omitted
    #[arg(long)]
    size: Option<u32>,
}

impl SearchArgs {
    fn filters(&self) -> ClientSearchFilters {
        ClientSearchFilters {
            id_cliente: None,
            cpf: self.cpf.clone(),
            nome: self.nome.clone(),
            cidade: self.cidade.clone(),
            uf: self.uf.clone(),
            ativo: self.ativo,
        }
    }
}

pub async fn run(client: &CadastroClient, args: SearchArgs) -> Result<()> {
    let page = client
        .search_clients(&args.filters(), args.page, args.size)
        .await
        .context("Failed to search clients")?;

    println!("{}", format::clients_table(&page.items));
    println!(
        "{} clientes encontrados (página {} de {})",
        page.total,
        page.page,
        page.pages.max(1)
    );
    Ok(())
}
