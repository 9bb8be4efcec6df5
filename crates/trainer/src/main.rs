//! Offline trainer for the collaborative filtering model.
//!
//! Loads the MovieLens ratings, builds the sparse user-item matrix, fits
//! the nearest-neighbor index, and persists the four model artifacts for
//! the scoring service to load at startup.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;

use cf_model::types::Metric;
use cf_model::{CfModel, NeighborIndex, artifacts, build_user_item_matrix, ratings};

/// Train the ReelRecs collaborative filtering model
#[derive(Parser)]
#[command(name = "train-cf")]
#[command(about = "Builds and persists the CF model from MovieLens ratings", long_about = None)]
struct Cli {
    /// Path to the MovieLens dataset directory (containing ratings.dat)
    #[arg(short, long, default_value = "data/ml-1m")]
    data_dir: PathBuf,

    /// Directory to write the model artifacts to
    #[arg(short, long, default_value = "models/collaborative_filtering")]
    output_dir: PathBuf,

    /// Number of nearest neighbors to use at query time
    #[arg(long, default_value = "20")]
    neighbors: usize,

    /// Distance metric (cosine or euclidean)
    #[arg(long, default_value = "cosine")]
    metric: String,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let metric: Metric = cli.metric.parse().context("Invalid --metric value")?;

    println!("{}", "=".repeat(60));
    println!("ReelRecs - Collaborative Filtering Model Training");
    println!("{}", "=".repeat(60));

    let ratings_path = cli.data_dir.join("ratings.dat");
    println!("Loading ratings from {}...", ratings_path.display());
    let start = Instant::now();
    let records = ratings::parse_ratings(&ratings_path)
        .with_context(|| format!("Failed to load ratings from {}", ratings_path.display()))?;
    println!(
        "{} Loaded {} ratings in {:?}",
        "✓".green(),
        records.len(),
        start.elapsed()
    );

    let start = Instant::now();
    let (matrix, users, movies) = build_user_item_matrix(&records);
    let index = NeighborIndex::fit(&matrix, cli.neighbors, metric);
    println!(
        "{} Built matrix and fit {} index (k={}) in {:?}",
        "✓".green(),
        metric,
        cli.neighbors,
        start.elapsed()
    );

    let n_users = matrix.n_rows();
    let n_movies = matrix.n_cols();
    let total_cells = n_users * n_movies;
    let sparsity = if total_cells > 0 {
        100.0 * (total_cells - matrix.nnz()) as f64 / total_cells as f64
    } else {
        0.0
    };

    let model = CfModel::new(matrix, index, users, movies);
    artifacts::save_model(&model, &cli.output_dir)
        .with_context(|| format!("Failed to save artifacts to {}", cli.output_dir.display()))?;
    println!(
        "{} Saved artifacts to {}",
        "✓".green(),
        cli.output_dir.display()
    );

    println!("Number of users: {}", n_users);
    println!("Number of movies: {}", n_movies);
    println!("Matrix sparsity: {:.2}%", sparsity);
    for name in [
        artifacts::MODEL_FILE,
        artifacts::MATRIX_FILE,
        artifacts::USER_MAP_FILE,
        artifacts::MOVIE_MAP_FILE,
    ] {
        let size = std::fs::metadata(cli.output_dir.join(name))?.len();
        println!("  {}: {:.2} MB", name, size as f64 / (1024.0 * 1024.0));
    }

    Ok(())
}
