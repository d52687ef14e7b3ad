use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use common::cli::{CommonArgs, CommonCommands, utils};
use common::service_bootstrap::ServiceBootstrap;
use server::{AppState, create_router};
use std::net::SocketAddr;
use tokio::sync::oneshot;

#[derive(Parser)]
#[command(name = "cadastro")]
#[command(about = "Cadastro - customer records service")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    command: Option<CadastroCommands>,

    #[arg(long, help = "HTTP API server port", default_value = "8000")]
    http_port: u16,

    #[arg(long, help = "Bind address for the server", default_value = "0.0.0.0")]
    bind: String,
}

#[derive(Subcommand)]
enum CadastroCommands {
    #[command(flatten)]
    Common(CommonCommands),
}

impl Default for CadastroCommands {
    fn default() -> Self {
        Self::Common(CommonCommands::Start)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on CLI arguments
    utils::init_logging(&cli.common);

    // Load application configuration
    let config = utils::load_config(cli.common.config.as_ref())?;

    // Handle common commands that don't require starting the service
    let command = cli.command.unwrap_or_default();
    let CadastroCommands::Common(ref common_cmd) = command;
    if utils::handle_common_command(common_cmd, &config).await? {
        return Ok(()); // Command handled, exit early
    }

    log::info!("Starting Cadastro server");

    let bind_ip = cli
        .bind
        .parse::<std::net::IpAddr>()
        .context("Invalid bind address")?;
    let http_addr = SocketAddr::new(bind_ip, cli.http_port);

    let bootstrap = ServiceBootstrap::new(config.clone())
        .await
        .context("Failed to initialize service")?;
    bootstrap
        .seed_admin_user()
        .await
        .context("Failed to seed admin user")?;

    let state = AppState::new(bootstrap.store().clone(), config);
    let app = create_router(state);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let http_handle = tokio::spawn(async move {
        log::info!("Starting HTTP server on {http_addr}");
        let listener = tokio::net::TcpListener::bind(http_addr)
            .await
            .expect("Failed to bind HTTP server");
        axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
                log::info!("HTTP server shutting down gracefully");
            })
            .await
            .expect("HTTP server error");
    });

    log::info!("Cadastro server listening on {http_addr}");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    log::info!("Received shutdown signal");
    let _ = shutdown_tx.send(());
    let _ = http_handle.await;

    Ok(())
}
