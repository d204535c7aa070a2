use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use trivia_api::db::exchange::{export_data, import_data};
use trivia_api::db::{establish_connection, run_migrations};
use trivia_api::server::app::run_server;
use trivia_api::settings::Settings;
use trivia_api::telemetry::init_tracing;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML config file
    #[clap(short, long)]
    config: Option<PathBuf>,
    #[clap(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API (default)
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
    /// Import categories.csv and questions.csv from a directory
    Import { path: PathBuf },
    /// Export categories.csv and questions.csv to a directory
    Export { path: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref()).context("Cannot load settings")?;
    let pool = establish_connection(&settings.database)
        .await
        .with_context(|| format!("Cannot connect to {}", settings.database.url))?;

    let command = cli.command.unwrap_or(Commands::Serve);
    if settings.database.run_migrations || matches!(command, Commands::Migrate) {
        tracing::info!("Running db migrations...");
        run_migrations(&pool).await?;
    }

    match command {
        Commands::Serve => run_server(pool, &settings.server).await?,
        Commands::Migrate => {}
        Commands::Import { path } => import_data(&pool, &path).await.context("Cannot import")?,
        Commands::Export { path } => export_data(&pool, &path).await.context("Cannot export")?,
    };
    Ok(())
}
