// Main entry point - Dependency injection and mode selection
mod domain;
mod application;
mod infrastructure;
mod presentation;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_service::DashboardService;
use crate::application::inventory_service::InventoryService;
use crate::infrastructure::config::{load_settings, Settings};
use crate::infrastructure::http_api_client::HttpCloudApi;
use crate::infrastructure::snapshot_repository::SnapshotRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::router::build_router;

#[derive(Parser, Debug)]
#[command(author, version, about = "Cloud resource dashboard and its summary API", long_about = None)]
struct Cli {
    /// Settings file; defaults to config/dashboard.* when present
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Serve the summary API from a JSON inventory snapshot
    Serve {
        /// Listen address, overrides server.bind
        #[arg(long)]
        bind: Option<String>,
        /// Snapshot file, overrides server.snapshot
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },
    /// Run the terminal dashboard (default)
    Dash {
        /// API base URL, overrides api.base_url
        #[arg(long)]
        api: Option<String>,
    },
}

fn env_filter(settings: &Settings) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.logging.level))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref()).context("Failed to load settings")?;

    match cli.mode.unwrap_or(Mode::Dash { api: None }) {
        Mode::Serve { bind, snapshot } => serve(settings, bind, snapshot).await,
        Mode::Dash { api } => dash(settings, api).await,
    }
}

async fn serve(settings: Settings, bind: Option<String>, snapshot: Option<PathBuf>) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(&settings))
        .init();

    let snapshot = snapshot.unwrap_or_else(|| PathBuf::from(&settings.server.snapshot));
    let bind = bind.unwrap_or(settings.server.bind);

    // Create repository (infrastructure layer)
    let repository = Arc::new(SnapshotRepository::load(&snapshot).await?);

    // Create service and state (application layer)
    let state = Arc::new(AppState {
        inventory_service: InventoryService::new(repository, settings.server.daily_window),
    });

    // Build router (presentation layer)
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    tracing::info!("Serving cloud summary API on {}", listener.local_addr()?);

    axum::serve(listener, router).await?;

    Ok(())
}

async fn dash(settings: Settings, api: Option<String>) -> anyhow::Result<()> {
    // The terminal owns stdout, so logs go to a file
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&settings.logging.file)
        .with_context(|| format!("Failed to open log file {}", settings.logging.file))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(&settings))
        .with_ansi(false)
        .with_writer(Mutex::new(log_file))
        .init();

    let base_url = api.unwrap_or(settings.api.base_url);
    let timeout = settings.api.request_timeout_ms.map(Duration::from_millis);
    let client = HttpCloudApi::new(base_url.clone(), timeout)?;
    tracing::info!("Dashboard polling {}", base_url);

    let frame_interval = settings.dashboard.frame_interval();
    let (service, events) = DashboardService::new(Arc::new(client), settings.dashboard);

    presentation::terminal::run(service, events, frame_interval).await
}
