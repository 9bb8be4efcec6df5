//! Persistence for the trained model.
//!
//! The trainer writes four co-located bincode files; the scoring service
//! loads them back as one unit. The mappings are persisted with the matrix
//! they were built against, so scores after a reload use the exact
//! row/column assignment from fit time. Loading any subset is an error.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{ModelError, Result};
use crate::knn::NeighborIndex;
use crate::matrix::CsrMatrix;
use crate::model::CfModel;
use crate::types::IdMap;

/// File names within the artifact directory
pub const MODEL_FILE: &str = "cf_model.bin";
pub const MATRIX_FILE: &str = "user_item_matrix.bin";
pub const USER_MAP_FILE: &str = "user_id_to_idx.bin";
pub const MOVIE_MAP_FILE: &str = "movie_id_to_idx.bin";

fn write_artifact<T: Serialize>(dir: &Path, name: &str, value: &T) -> Result<PathBuf> {
    let path = dir.join(name);
    let writer = BufWriter::new(File::create(&path)?);
    bincode::serialize_into(writer, value).map_err(|e| ModelError::ArtifactCorrupt {
        path: path.clone(),
        reason: e.to_string(),
    })?;
    Ok(path)
}

fn read_artifact<T: DeserializeOwned>(dir: &Path, name: &str) -> Result<T> {
    let path = dir.join(name);
    if !path.is_file() {
        return Err(ModelError::ArtifactMissing { path });
    }
    let reader = BufReader::new(File::open(&path)?);
    bincode::deserialize_from(reader).map_err(|e| ModelError::ArtifactCorrupt {
        path,
        reason: e.to_string(),
    })
}

/// Write all four artifacts into `dir`, creating it if needed
pub fn save_model(model: &CfModel, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    write_artifact(dir, MODEL_FILE, model.index())?;
    write_artifact(dir, MATRIX_FILE, model.matrix())?;
    write_artifact(dir, USER_MAP_FILE, model.users())?;
    write_artifact(dir, MOVIE_MAP_FILE, model.movies())?;
    info!("Saved model artifacts to {}", dir.display());
    Ok(())
}

/// Load the complete artifact set from `dir`.
///
/// Fails if any of the four files is missing or undecodable; a service must
/// refuse to start in that case.
pub fn load_model(dir: &Path) -> Result<CfModel> {
    let index: NeighborIndex = read_artifact(dir, MODEL_FILE)?;
    let matrix: CsrMatrix = read_artifact(dir, MATRIX_FILE)?;
    let users: IdMap = read_artifact(dir, USER_MAP_FILE)?;
    let movies: IdMap = read_artifact(dir, MOVIE_MAP_FILE)?;
    info!(
        "Loaded model artifacts from {} ({} users x {} movies, {} ratings, k={}, metric={})",
        dir.display(),
        matrix.n_rows(),
        matrix.n_cols(),
        matrix.nnz(),
        index.k(),
        index.metric()
    );
    Ok(CfModel::new(matrix, index, users, movies))
}
