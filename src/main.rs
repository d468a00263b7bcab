//! SprintPulse — sprint retrospective automation service.
//!
//! Receives work created/updated events, schedules sprint-end and
//! mid-sprint events against the work-tracking platform, and when those
//! come back, posts velocity summaries and alerts to Slack.

mod handlers;
mod server;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

use handlers::AppState;
use sprintpulse_core::SprintPulseConfig;
use sprintpulse_registry::{SprintRegistry, run_pruner};
use sprintpulse_scheduler::EventScheduler;
use sprintpulse_summary::SummaryGenerator;
use sprintpulse_track::TrackClient;

#[derive(Parser, Debug)]
#[command(name = "sprintpulse", about = "Sprint retrospective automation service")]
struct Cli {
    /// Path to config.toml (default: ~/.sprintpulse/config.toml).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the listen port.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sprintpulse=info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => SprintPulseConfig::load_from(path)?,
        None => SprintPulseConfig::load()?,
    };
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let registry = Arc::new(Mutex::new(SprintRegistry::new(
        config.registry.retention_hours,
    )));
    let track = Arc::new(TrackClient::new(&config.platform));
    let summarizer: Arc<dyn sprintpulse_core::traits::Summarizer> =
        Arc::from(sprintpulse_providers::create_summarizer(&config.llm));

    let state = Arc::new(AppState {
        scheduler: EventScheduler::new(track.clone(), config.platform.event_source_id.clone()),
        issues: track,
        generator: SummaryGenerator::new(summarizer, registry.clone()),
        messages: Arc::new(sprintpulse_channels::WebhookSink::new()),
        registry: registry.clone(),
        config,
    });

    // Background maintenance, decoupled from request handling.
    let prune_interval_secs = state.config.registry.prune_interval_hours * 3600;
    tokio::spawn(run_pruner(registry, prune_interval_secs));

    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    tracing::info!("🚀 SprintPulse listening on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, server::build_router(state)).await?;
    Ok(())
}
