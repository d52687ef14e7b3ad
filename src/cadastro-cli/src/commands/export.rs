use anyhow::{Context, Result};
use cadastro_api::{ClientSearchFilters, ExportFormat, ExportRequest};
use cadastro_sdk::CadastroClient;
use clap::Args;
use std::path::PathBuf;

fn parse_format(value: &str) -> Result<ExportFormat, String> {
    value.parse()
}

#[derive(Args)]
pub struct ExportArgs {
    /// Output format: excel, csv, or pdf
    #[arg(long, value_parser = parse_format)]
    format: ExportFormat,

    /// Export a single record by id; the file is named after its CPF
    #[arg(long, conflicts_with_all = ["cpf", "nome", "cidade", "uf", "ativo"])]
    id: Option<i64>,

    /// Filter by CPF (substring match)
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

    /// Directory to write the download into
    #[arg(long, default_value = ".")]
    output: PathBuf,
}

pub async fn run(client: &CadastroClient, args: ExportArgs) -> Result<()> {
    let format = args.format;

    // The request carries exactly the selected filter set; single-record
    // exports fetch the record first so the file can be named by CPF.
    let (filters, filename) = match args.id {
        Some(id) => {
            let record = client
                .get_client(id)
                .await
                .context("Failed to load client details")?;
            (
                ClientSearchFilters {
                    id_cliente: Some(id),
                    ..Default::default()
                },
                format!("cliente_{}.{}", record.cpf, format.extension()),
            )
        }
        None => (
            ClientSearchFilters {
                id_cliente: None,
                cpf: args.cpf,
                nome: args.nome,
                cidade: args.cidade,
                uf: args.uf,
                ativo: args.ativo,
            },
            format!(
                "clientes_{}_{}.{}",
                format.as_str(),
                chrono::Local::now().format("%Y-%m-%d"),
                format.extension()
            ),
        ),
    };

    let bytes = client
        .export_clients(&ExportRequest { format, filters })
        .await
        .context("Failed to export clients")?;

    let path = args.output.join(filename);
    std::fs::write(&path, &bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("Saved {} bytes to {}", bytes.len(), path.display());
    Ok(())
}
