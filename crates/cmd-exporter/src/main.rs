//! cmd_exporter
//!
//! Runs configured shell commands on every scrape and publishes their exit
//! status and output as gauges on `/metrics`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cmd_exporter::{app_state, config, router};
use cmd_exporter_core::error::{ExporterError, Result};

#[derive(Debug, Parser)]
#[command(name = "cmd_exporter")]
#[command(about = "Prometheus exporter for the exit status of shell commands")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Configuration file location
    #[arg(short, long, default_value = "cmd_exporter.yml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(code = e.code().as_str(), error = %e, "cmd_exporter stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let cfg = config::load_from_file(&cli.config)?;
    let listen = cfg.bind_address();

    let state = app_state::AppState::new(cfg)?;
    let app = router::build_router(state);

    tracing::info!(%listen, config = %cli.config.display(), "cmd_exporter starting");
    let listener = tokio::net::TcpListener::bind(&listen)
        .await
        .map_err(|e| ExporterError::Internal(format!("bind {listen} failed: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| ExporterError::Internal(format!("server failed: {e}")))
}
