use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use api_ingress::{ApiIngress, ApiIngressConfig};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs};
use users_directory::api::rest::error::ErrorExposure;
use users_directory::config::UsersDirectoryConfig;
use users_directory::UsersDirectory;

mod db;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// User Directory Server - list, search and delete users over HTTP
#[derive(Parser)]
#[command(name = "user-directory-server")]
#[command(about = "User Directory Server - list, search and delete users over HTTP")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Run against a throwaway in-memory database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("User Directory Server starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(&config),
    }
}

fn ingress_for(config: &AppConfig) -> Result<ApiIngress> {
    let ingress_cfg: ApiIngressConfig = config.module_config("api_ingress")?;
    let timeout = Duration::from_secs(config.server.timeout_sec);
    Ok(ApiIngress::new(ingress_cfg)
        .with_request_timeout(Some(timeout))
        .with_internal_errors_exposed(config.server.environment.is_development()))
}

async fn run_server(config: AppConfig) -> Result<()> {
    tracing::info!("Initializing modules...");

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "Invalid bind address '{}:{}'",
                config.server.host, config.server.port
            )
        })?;

    let users_cfg: UsersDirectoryConfig = config.module_config("users_directory")?;
    let ingress = ingress_for(&config)?;

    let db_config = config
        .database
        .clone()
        .context("No database configuration found")?;
    let base_dir = PathBuf::from(&config.server.home_dir);
    let conn = db::connect(&db_config, &base_dir).await?;

    let users = UsersDirectory::new(conn, users_cfg);
    users.migrate().await?;
    users.bootstrap().await;

    let exposure = if config.server.environment.is_development() {
        ErrorExposure::development()
    } else {
        ErrorExposure::production()
    };
    let routes = users.register_rest(axum::Router::new(), exposure);
    let router = ingress.build_router(routes, vec![UsersDirectory::openapi()])?;

    ApiIngress::bind_and_serve(router, addr, async {
        if let Err(e) = runtime::shutdown::wait_for_shutdown().await {
            tracing::warn!(error = %e, "shutdown: signal waiter failed; falling back to ctrl_c()");
            let _ = tokio::signal::ctrl_c().await;
        }
    })
    .await
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    // Module sections must deserialize into their typed configs.
    config.module_config::<UsersDirectoryConfig>("users_directory")?;
    ingress_for(config)?.build_router(axum::Router::new(), Vec::new())?;
    if let Some(db_config) = &config.database {
        db::ensure_sqlite(&db_config.url)?;
    }

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("Server config:");
    println!("{}", config.to_yaml()?);
    Ok(())
}
