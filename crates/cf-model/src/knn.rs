//! Brute-force k-nearest-neighbor index over matrix rows.
//!
//! Fitting precomputes per-row norms once at training time; each query then
//! scans all rows (in parallel with rayon) and keeps the k closest. For the
//! MovieLens-scale row counts this serves, a scan is fast enough and avoids
//! an approximate-index dependency.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::matrix::CsrMatrix;
use crate::types::Metric;

/// Result of a neighbor query: row indices with their distances, both
/// ordered by ascending distance. May hold fewer than k entries when the
/// matrix has fewer than k rows; callers must handle a short result.
#[derive(Debug, Clone)]
pub struct Neighbors {
    pub distances: Vec<f32>,
    pub indices: Vec<usize>,
}

impl Neighbors {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Fitted neighbor structure. Persisted as one of the four model artifacts;
/// the matrix itself is stored separately and supplied at query time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeighborIndex {
    k: usize,
    metric: Metric,
    row_norms: Vec<f32>,
}

impl NeighborIndex {
    /// Default neighbor count, matching the training configuration
    pub const DEFAULT_K: usize = 20;

    /// Fit the index over the rows of `matrix`
    pub fn fit(matrix: &CsrMatrix, k: usize, metric: Metric) -> Self {
        let row_norms = (0..matrix.n_rows())
            .map(|r| {
                let (_, vals) = matrix.row(r);
                vals.iter().map(|v| v * v).sum::<f32>().sqrt()
            })
            .collect();
        Self {
            k,
            metric,
            row_norms,
        }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// Find the k rows of `matrix` nearest to the dense `query` vector.
    ///
    /// `matrix` must be the same matrix the index was fit on; the norms are
    /// only valid for those rows.
    pub fn kneighbors(&self, matrix: &CsrMatrix, query: &[f32]) -> Neighbors {
        debug_assert_eq!(self.row_norms.len(), matrix.n_rows());
        let query_norm = query.iter().map(|v| v * v).sum::<f32>().sqrt();

        let mut scored: Vec<(f32, usize)> = (0..matrix.n_rows())
            .into_par_iter()
            .map(|r| (self.distance(matrix, query, query_norm, r), r))
            .collect();

        // Ascending distance, row index as tie-breaker for determinism
        scored.sort_unstable_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        scored.truncate(self.k.min(matrix.n_rows()));

        Neighbors {
            distances: scored.iter().map(|&(d, _)| d).collect(),
            indices: scored.iter().map(|&(_, r)| r).collect(),
        }
    }

    fn distance(&self, matrix: &CsrMatrix, query: &[f32], query_norm: f32, row: usize) -> f32 {
        let (cols, vals) = matrix.row(row);
        let dot: f32 = cols
            .iter()
            .zip(vals)
            .map(|(&c, &v)| query[c as usize] * v)
            .sum();
        let row_norm = self.row_norms[row];

        match self.metric {
            Metric::Cosine => {
                // Cosine is undefined against a zero vector; treat it as
                // maximally distant so it never contributes similarity.
                if query_norm == 0.0 || row_norm == 0.0 {
                    1.0
                } else {
                    1.0 - dot / (query_norm * row_norm)
                }
            }
            Metric::Euclidean => {
                let d2 = query_norm * query_norm + row_norm * row_norm - 2.0 * dot;
                d2.max(0.0).sqrt()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::build_user_item_matrix;
    use crate::types::RatingRecord;

    fn record(user_id: u32, movie_id: u32, rating: f32) -> RatingRecord {
        RatingRecord {
            user_id,
            movie_id,
            rating,
            timestamp: 0,
        }
    }

    fn test_matrix() -> CsrMatrix {
        // Row 0: (5, 0), row 1: (5, 5), row 2: (0, 3)
        let records = vec![
            record(1, 10, 5.0),
            record(2, 10, 5.0),
            record(2, 20, 5.0),
            record(3, 20, 3.0),
        ];
        build_user_item_matrix(&records).0
    }

    #[test]
    fn test_identical_row_is_nearest_under_cosine() {
        let matrix = test_matrix();
        let index = NeighborIndex::fit(&matrix, 3, Metric::Cosine);
        let neighbors = index.kneighbors(&matrix, &matrix.row_dense(0));

        assert_eq!(neighbors.indices[0], 0);
        assert!(neighbors.distances[0].abs() < 1e-6);
        // Row 1 shares one axis (45 degrees), row 2 is orthogonal
        assert_eq!(neighbors.indices, vec![0, 1, 2]);
        assert!((neighbors.distances[1] - (1.0 - 1.0 / 2.0_f32.sqrt())).abs() < 1e-6);
        assert!((neighbors.distances[2] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_short_result_when_fewer_rows_than_k() {
        let matrix = test_matrix();
        let index = NeighborIndex::fit(&matrix, 20, Metric::Cosine);
        let neighbors = index.kneighbors(&matrix, &matrix.row_dense(1));
        assert_eq!(neighbors.len(), 3);
    }

    #[test]
    fn test_zero_query_vector_is_maximally_distant() {
        let matrix = test_matrix();
        let index = NeighborIndex::fit(&matrix, 3, Metric::Cosine);
        let neighbors = index.kneighbors(&matrix, &[0.0, 0.0]);
        assert!(neighbors.distances.iter().all(|&d| (d - 1.0).abs() < 1e-6));
    }

    #[test]
    fn test_euclidean_ordering() {
        let matrix = test_matrix();
        let index = NeighborIndex::fit(&matrix, 3, Metric::Euclidean);
        let neighbors = index.kneighbors(&matrix, &matrix.row_dense(0));

        assert_eq!(neighbors.indices[0], 0);
        assert!(neighbors.distances[0].abs() < 1e-6);
        // Distances: row 1 at 5.0, row 2 at sqrt(25 + 9)
        assert_eq!(neighbors.indices, vec![0, 1, 2]);
        assert!((neighbors.distances[1] - 5.0).abs() < 1e-5);
        assert!((neighbors.distances[2] - 34.0_f32.sqrt()).abs() < 1e-5);
    }
}
