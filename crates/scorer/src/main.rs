//! ML scorer service entry point.
//!
//! Loads the trained model artifacts, then serves the MLScorer gRPC
//! contract. The artifacts must load completely before the listener
//! starts; a missing or corrupt file aborts startup.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tonic::transport::Server;
use tracing::info;

use scorer::MLScorerService;
use scorer::recommendations::ml_scorer_server::MlScorerServer;

/// ML scoring service for the ReelRecs recommendation engine
#[derive(Parser)]
#[command(name = "ml-scorer")]
#[command(about = "gRPC service scoring candidate movies with collaborative filtering", long_about = None)]
struct Cli {
    /// Port to listen on
    #[arg(long, default_value = "50051")]
    port: u16,

    /// Directory containing the trained model artifacts
    #[arg(long, default_value = "models/collaborative_filtering")]
    model_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    info!("Initializing ML scorer service...");
    let model = cf_model::artifacts::load_model(&cli.model_dir)
        .with_context(|| format!("Failed to load model from {}", cli.model_dir.display()))?;
    let service = MLScorerService::new(Arc::new(model));

    let addr = format!("[::]:{}", cli.port)
        .parse()
        .context("Invalid listen address")?;
    info!("Starting ML scorer service on port {}...", cli.port);

    Server::builder()
        .add_service(MlScorerServer::new(service))
        .serve_with_shutdown(addr, async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutting down ML scorer service...");
        })
        .await
        .context("gRPC server failed")?;

    info!("ML scorer service shut down");
    Ok(())
}
