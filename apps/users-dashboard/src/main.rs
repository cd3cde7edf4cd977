use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use users_dashboard::command::{self, Command};
use users_dashboard::render::render;
use users_dashboard::{DashboardConfig, DashboardController, UsersApiClient};

/// Users Dashboard - search and delete users from the terminal
#[derive(Parser)]
#[command(name = "users-dashboard")]
#[command(version = "0.1.0")]
#[command(after_help = "Input: plain text searches; /delete <id>, /confirm, /cancel, /refresh, /quit")]
struct Cli {
    /// Path to a YAML file with a `dashboard` section
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// API root, e.g. http://localhost:4000/api (overrides config)
    #[arg(long)]
    base_url: Option<String>,

    /// Search debounce in milliseconds (overrides config)
    #[arg(long)]
    debounce_ms: Option<u64>,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    // stdout belongs to the dashboard itself
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = DashboardConfig::load(cli.config.as_deref())?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(ms) = cli.debounce_ms {
        config.debounce_ms = ms;
    }
    let api_url = config.api_url()?;
    tracing::info!(base_url = %api_url, debounce_ms = config.debounce_ms, "Users dashboard starting");

    let controller = DashboardController::new(
        Arc::new(UsersApiClient::new(&api_url)),
        Duration::from_millis(config.debounce_ms),
    );

    let mut updates = controller.subscribe();
    let printer = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let frame = render(&updates.borrow_and_update());
            println!("{frame}");
        }
    });

    controller.refresh().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match command::parse(&line) {
            Ok(Command::Search(text)) => controller.set_search_text(text),
            Ok(Command::Delete(id)) => {
                if !controller.request_delete(id) {
                    eprintln!("No user with id {id} in the current list");
                }
            }
            // The failure is already shown inside the confirmation prompt.
            Ok(Command::Confirm) => {
                let _ = controller.confirm_delete().await;
            }
            Ok(Command::Cancel) => controller.cancel_delete(),
            Ok(Command::Refresh) => controller.refresh().await,
            Ok(Command::Quit) => break,
            Err(msg) => eprintln!("{msg}"),
        }
    }

    drop(controller);
    printer.abort();
    Ok(())
}
