use std::sync::Arc;

use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use skincheck_core::{
    classifier::{ClassifierAdapter, RandomSkinModel},
    database::PostgresDatabase,
};
use skincheck_server::{
    AppState,
    auth::JwtTokenVerifier,
    infra::{
        config::{Config, ConfigLoad, ConfigLoader},
        telemetry::init_tracing,
    },
    routes::create_app,
};
use tracing::{info, warn};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "skincheck-server")]
#[command(about = "SkinCheck scan API for the mobile app")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(ClapArgs, Debug, Clone)]
struct ServeArgs {
    /// Server port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Path to a skincheck.toml configuration file
    #[arg(long, env = "SKINCHECK_CONFIG")]
    config: Option<std::path::PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(subcommand)]
    Db(DbCommand),
}

#[derive(Debug, Subcommand)]
enum DbCommand {
    /// Apply database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(command) = cli.command {
        match command {
            Command::Db(DbCommand::Migrate) => {
                run_db_migrate(&cli.serve).await?;
                return Ok(());
            }
        }
    }

    run_server(cli.serve).await
}

async fn run_db_migrate(args: &ServeArgs) -> anyhow::Result<()> {
    let config = load_runtime_config(args)?;
    let db = connect_database(&config).await?;
    db.migrate().await.context("database migration failed")?;
    info!("Database migrations applied successfully");
    Ok(())
}

async fn run_server(args: ServeArgs) -> anyhow::Result<()> {
    let config = load_runtime_config(&args)?;

    let db = connect_database(&config).await?;
    db.migrate().await.context("database migration failed")?;

    let state = AppState::new(
        Arc::new(db.scans()),
        ClassifierAdapter::new(Arc::new(RandomSkinModel::new())),
        Arc::new(JwtTokenVerifier::new(&config.auth.jwt_secret)),
    );
    let router =
        create_app(state, &config.cors, config.server.max_body_bytes);

    let listener = tokio::net::TcpListener::bind(config.server.bind_address())
        .await
        .with_context(|| {
            format!(
                "failed to bind {}:{}",
                config.server.host, config.server.port
            )
        })?;
    info!(
        "Starting SkinCheck API on {}:{}",
        config.server.host, config.server.port
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn connect_database(config: &Config) -> anyhow::Result<PostgresDatabase> {
    PostgresDatabase::connect(
        &config.database.url,
        config.database.pool_settings(),
    )
    .await
    .context("failed to connect to PostgreSQL")
}

fn load_runtime_config(args: &ServeArgs) -> anyhow::Result<Config> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = args.config.clone() {
        loader = loader.with_config_path(path);
    }
    let ConfigLoad {
        mut config,
        warnings,
    } = loader.load().context("failed to load configuration")?;

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host.clone() {
        config.server.host = host;
    }

    init_tracing();

    if config.metadata.env_file_loaded {
        info!("loaded .env file");
    }
    if let Some(path) = config.metadata.config_path.as_ref() {
        info!(path = %path.display(), "configuration file loaded");
    }

    for warning in &warnings.items {
        match &warning.hint {
            Some(hint) => {
                warn!(message = %warning.message, hint = %hint, "configuration warning")
            }
            None => warn!(message = %warning.message, "configuration warning"),
        }
    }

    Ok(config)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
