//! # CF Model Crate
//!
//! Collaborative filtering core for the ReelRecs scoring service.
//!
//! ## Main Components
//!
//! - **types**: Domain types (RatingRecord, IdMap, Metric)
//! - **ratings**: Parse the MovieLens ratings file
//! - **matrix**: Sparse user-item interaction matrix (CSR)
//! - **knn**: Fitted k-nearest-neighbor index over matrix rows
//! - **model**: The CF predictor (single and batch scoring)
//! - **blend**: Fixed-weight blending of CF and feature scores
//! - **artifacts**: Save/load the four persisted model files
//! - **error**: Error types for training and loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use cf_model::{artifacts, blend, knn::NeighborIndex, matrix, ratings, types::Metric, CfModel};
//! use std::path::Path;
//!
//! // Offline: train and persist
//! let records = ratings::parse_ratings(Path::new("data/ml-1m/ratings.dat"))?;
//! let (matrix, users, movies) = matrix::build_user_item_matrix(&records);
//! let index = NeighborIndex::fit(&matrix, NeighborIndex::DEFAULT_K, Metric::Cosine);
//! let model = CfModel::new(matrix, index, users, movies);
//! artifacts::save_model(&model, Path::new("models/collaborative_filtering"))?;
//!
//! // Serving: load once, score many
//! let model = artifacts::load_model(Path::new("models/collaborative_filtering"))?;
//! let scores = model.batch_score(1, &[1193, 661, 914]);
//! ```

pub mod artifacts;
pub mod blend;
pub mod error;
pub mod knn;
pub mod matrix;
pub mod model;
pub mod ratings;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{ModelError, Result};
pub use knn::{NeighborIndex, Neighbors};
pub use matrix::{CsrMatrix, build_user_item_matrix};
pub use model::CfModel;
pub use types::{IdMap, Metric, MovieId, RatingRecord, UserId};
