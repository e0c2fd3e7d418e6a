use std::fs::{self, OpenOptions};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::{broadcast, mpsc};
use tracing_subscriber::EnvFilter;

use pecha_admin::api::ApiClient;
use pecha_admin::app::state::{run_state_manager, AppMessage, AppState};
use pecha_admin::config::Settings;
use pecha_admin::ui::app::TuiApp;

#[derive(Parser, Debug)]
#[command(name = "pecha-admin")]
#[command(about = "Terminal admin client for pecha metadata and categories")]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<String>,

    /// Backend API base URL (overrides the config file)
    #[arg(long, env = "PECHA_ADMIN_API_URL")]
    api_url: Option<String>,

    /// Publishing site sent with category assignments
    #[arg(long)]
    site: Option<String>,

    /// Log filter, e.g. `info` or `pecha_admin=debug`
    #[arg(long)]
    log_level: Option<String>,

    /// Write a default config file if none exists, then exit
    #[arg(long)]
    init_config: bool,
}

/// Log to a file; the terminal belongs to the TUI
fn init_logging(settings: &Settings) -> Result<()> {
    let path = settings.log_path();
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.init_config {
        let (path, created) = Settings::init_file(args.config.as_deref())?;
        if created {
            println!("Wrote default config to {}", path.display());
        } else {
            println!("Config already exists at {}", path.display());
        }
        return Ok(());
    }

    // Load settings, then apply command line overrides
    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(url) = args.api_url {
        settings.api_base_url = url;
    }
    if let Some(site) = args.site {
        settings.site = site;
    }
    if let Some(level) = args.log_level {
        settings.log_level = level;
    }

    init_logging(&settings)?;
    tracing::info!("Starting pecha-admin against {}", settings.api_base_url);

    // Panics would otherwise be written into the alternate screen
    std::panic::set_hook(Box::new(|info| {
        tracing::error!("panic: {}", info);
    }));

    let api = ApiClient::from_settings(&settings).context("Invalid API configuration")?;

    // Create channels for communication
    let (state_tx, state_rx) = mpsc::channel(256);
    let (ui_update_tx, _) = broadcast::channel(100);

    // Create shared application state
    let state = Arc::new(AppState::new(settings, api, ui_update_tx));

    // Start state manager
    let state_clone = state.clone();
    let manager_tx = state_tx.clone();
    let state_manager_handle = tokio::spawn(async move {
        run_state_manager(state_clone, state_rx, manager_tx).await;
    });

    // Initial data
    state_tx.send(AppMessage::RefreshCatalog).await?;
    state_tx.send(AppMessage::FetchPechas { page: 0 }).await?;

    // Run TUI (blocks until user quits)
    let mut tui = TuiApp::new(state.clone(), state_tx)?;
    let result = tui.run().await;

    state_manager_handle.abort();

    result
}
