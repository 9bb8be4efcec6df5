//! Collaborative filtering predictor.
//!
//! Wraps the interaction matrix, the fitted neighbor index, and both ID
//! mappings into one immutable value. The serving process constructs it once
//! at startup and shares it read-only across request handlers.

use tracing::debug;

use crate::knn::{NeighborIndex, Neighbors};
use crate::matrix::CsrMatrix;
use crate::types::{IdMap, MovieId, UserId};

/// Rating scale used for normalization: ratings run from 1.0 to 5.0
const RATING_MIN: f32 = 1.0;
const RATING_RANGE: f32 = 4.0;

/// The loaded collaborative filtering model
#[derive(Debug, Clone)]
pub struct CfModel {
    matrix: CsrMatrix,
    index: NeighborIndex,
    users: IdMap,
    movies: IdMap,
}

impl CfModel {
    pub fn new(matrix: CsrMatrix, index: NeighborIndex, users: IdMap, movies: IdMap) -> Self {
        Self {
            matrix,
            index,
            users,
            movies,
        }
    }

    pub fn matrix(&self) -> &CsrMatrix {
        &self.matrix
    }

    pub fn index(&self) -> &NeighborIndex {
        &self.index
    }

    pub fn users(&self) -> &IdMap {
        &self.users
    }

    pub fn movies(&self) -> &IdMap {
        &self.movies
    }

    /// Predicted affinity of `user_id` for `movie_id`, in [0, 1].
    ///
    /// Unknown users and unknown movies score 0.0 rather than erroring.
    /// Runs a fresh neighbor query per call; use [`batch_score`] to share
    /// one query across many movies.
    ///
    /// [`batch_score`]: CfModel::batch_score
    pub fn score(&self, user_id: UserId, movie_id: MovieId) -> f32 {
        let Some(user_row) = self.users.position(user_id) else {
            debug!("user {} not in matrix, scoring 0.0", user_id);
            return 0.0;
        };
        let query = self.matrix.row_dense(user_row);
        let neighbors = self.index.kneighbors(&self.matrix, &query);
        self.predict_for_movie(&neighbors, movie_id)
    }

    /// Score many movies for one user against a single shared neighbor set.
    ///
    /// The neighbor query runs exactly once per call. Returns one score per
    /// input movie, in input order; an unknown user yields all zeros of
    /// matching length.
    pub fn batch_score(&self, user_id: UserId, movie_ids: &[MovieId]) -> Vec<f32> {
        let Some(user_row) = self.users.position(user_id) else {
            debug!("user {} not in matrix, scoring batch of {} as 0.0", user_id, movie_ids.len());
            return vec![0.0; movie_ids.len()];
        };
        let query = self.matrix.row_dense(user_row);
        let neighbors = self.index.kneighbors(&self.matrix, &query);
        movie_ids
            .iter()
            .map(|&movie_id| self.predict_for_movie(&neighbors, movie_id))
            .collect()
    }

    /// Aggregate neighbor ratings of one movie into a normalized score
    fn predict_for_movie(&self, neighbors: &Neighbors, movie_id: MovieId) -> f32 {
        let Some(col) = self.movies.position(movie_id) else {
            return 0.0;
        };
        let ratings = self.matrix.gather_column(&neighbors.indices, col);

        // A stored 0 means unrated; only strictly positive ratings count
        let mut valid_ratings = Vec::new();
        let mut valid_similarities = Vec::new();
        for (rating, &distance) in ratings.iter().zip(&neighbors.distances) {
            if *rating > 0.0 {
                valid_ratings.push(*rating);
                valid_similarities.push(1.0 - distance);
            }
        }
        if valid_ratings.is_empty() {
            return 0.0;
        }

        let similarity_sum: f32 = valid_similarities.iter().sum();
        let predicted = if similarity_sum <= 0.0 {
            // Orthogonal or anti-correlated neighbors carry no usable
            // weight; fall back to the plain mean of their ratings.
            valid_ratings.iter().sum::<f32>() / valid_ratings.len() as f32
        } else {
            valid_ratings
                .iter()
                .zip(&valid_similarities)
                .map(|(r, s)| r * s)
                .sum::<f32>()
                / similarity_sum
        };

        (predicted - RATING_MIN) / RATING_RANGE
    }
}
