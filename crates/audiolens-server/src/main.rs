//! Audiolens server - REST surface over the serving harness
//!
//! Endpoints: `GET /healthz`, `POST /transcribe`, `POST /evaluate`. The
//! runtime daemon is probed at startup but the server comes up regardless;
//! requests answer 503 until the runtime is reachable.

use anyhow::{Context, Result};
use audiolens_core::{Config, InferenceBackend, RunnerBackend};
use axum::routing::{get, post};
use axum::Router;
use clap::Parser;

mod routes;

#[derive(Parser)]
#[command(name = "audiolens-server")]
#[command(version)]
#[command(about = "REST API server for audio understanding", long_about = None)]
struct Args {
    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind to
    #[arg(long, default_value_t = 8000)]
    port: u16,

    /// Runtime daemon endpoint (overrides config file and AUDIOLENS_ENDPOINT)
    #[arg(long)]
    endpoint: Option<String>,

    /// Path to config file
    #[arg(short, long)]
    config: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Shared per-request state
#[derive(Clone)]
pub struct AppState {
    pub backend: RunnerBackend,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(false)
        .init();

    let config = Config::load(args.config.as_deref())?;
    let backend = RunnerBackend::new(&config, args.endpoint.as_deref())?;

    // Probe the runtime once so operators see its state in the startup log
    let probe = backend.clone();
    match tokio::task::spawn_blocking(move || probe.health()).await? {
        Ok(info) => tracing::info!("Runtime up: {} on {}", info.model, info.device),
        Err(e) => tracing::warn!("Runtime not reachable yet: {}", e),
    }

    let state = AppState { backend };

    let app = Router::new()
        .route("/healthz", get(routes::healthz))
        .route("/transcribe", post(routes::transcribe))
        .route("/evaluate", post(routes::evaluate_handler))
        .with_state(state);

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
