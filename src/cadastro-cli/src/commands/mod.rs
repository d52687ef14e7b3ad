pub mod auth;
pub mod dashboard;
pub mod export;
pub mod search;
pub mod show;

use crate::session::Session;
use cadastro_sdk::CadastroClient;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Cadastro CLI — search, view, and export client records
#[derive(Parser)]
#[command(name = "cadastro-cli", version, about)]
pub struct Cli {
    /// Cadastro server base URL
    #[arg(long, env = "CADASTRO_URL", default_value = "http://localhost:8000")]
    url: String,

    /// Token file path (defaults to ~/.cadastro/token)
    #[arg(long, env = "CADASTRO_TOKEN_FILE")]
    token_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the navigation hub (default)
    Dashboard,
    /// Log in and store the access token
    Login {
        /// Operator email; prompted when omitted
        #[arg(long)]
        email: Option<String>,
    },
    /// Remove the stored access token
    Logout,
    /// Search client records
    Search(search::SearchArgs),
    /// Show one client record
    Show {
        /// Client id
        id: i64,
    },
    /// Export client records to a file
    Export(export::ExportArgs),
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let session = Session::new(self.token_file);
        let client = CadastroClient::with_token(&self.url, session.load_token());

        match self.command.unwrap_or(Commands::Dashboard) {
            Commands::Dashboard => dashboard::run(),
            Commands::Login { email } => auth::login(&client, &session, email).await,
            Commands::Logout => auth::logout(&session),
            Commands::Search(args) => search::run(&client, args).await,
            Commands::Show { id } => show::run(&client, id).await,
            Commands::Export(args) => export::run(&client, args).await,
        }
    }
}
