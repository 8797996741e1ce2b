//! # Workforce API Main Entry Point

use anyhow::Context;
use clap::{Parser, Subcommand};
use workforce::{config::ConfigLoader, db, seeds, server::run_server, telemetry};

#[derive(Debug, Parser)]
#[command(name = "workforce", version, about = "Workforce API service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply migrations and serve the HTTP API (default)
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
    /// Create missing built-in roles and default permissions for every tenant
    BootstrapRoles,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration from layered env files and variables
    let config = ConfigLoader::new().load()?;
    telemetry::init_tracing(&config).context("Failed to initialize tracing")?;

    tracing::info!(profile = %config.profile, "Loaded configuration");
    if let Ok(redacted_json) = config.redacted_json() {
        tracing::debug!(config = %redacted_json, "Effective configuration");
    }

    let db = db::init_pool(&config).await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            db::run_migrations(&db).await?;
            run_server(config, db).await
        }
        Command::Migrate => db::run_migrations(&db).await,
        Command::BootstrapRoles => {
            db::run_migrations(&db).await?;
            let report = seeds::bootstrap_roles(&db).await?;
            println!(
                "Bootstrapped {} tenant(s): {} role(s), {} permission(s) created",
                report.tenants, report.roles_created, report.permissions_created
            );
            Ok(())
        }
    }
}
