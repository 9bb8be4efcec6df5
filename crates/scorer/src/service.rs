//! Implementation of the MLScorer gRPC service.
//!
//! One request scores a whole candidate batch for a single user. The CF
//! scores for the batch come from one neighbor query; blending then runs
//! per candidate with fault isolation, so one bad candidate gets a default
//! score instead of failing the call. The response always carries exactly
//! one score per candidate, in request order.

use std::sync::Arc;

use tonic::{Request, Response, Status};
use tracing::{debug, error, info, warn};

use cf_model::{CfModel, blend};

use crate::recommendations::{
    CandidateFeatures, ScoreRequest, ScoreResponse, ml_scorer_server::MlScorer,
};

/// Score substituted when one candidate fails to score
pub const DEFAULT_SCORE: f32 = 0.5;

/// Outcome of scoring a single candidate.
///
/// Kept explicit so logs and tests can tell a genuinely computed 0.5 apart
/// from a substituted default.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreOutcome {
    /// Blended score computed normally
    Computed(f32),
    /// Scoring failed; the default was substituted
    Defaulted { value: f32, cause: String },
}

impl ScoreOutcome {
    /// The score that goes into the response
    pub fn value(&self) -> f32 {
        match self {
            ScoreOutcome::Computed(v) => *v,
            ScoreOutcome::Defaulted { value, .. } => *value,
        }
    }
}

/// Score one candidate from its CF score and feature bundle.
///
/// Feature values arrive off the wire, so non-finite floats are the
/// malformed-bundle case to isolate; anything else blends normally, with
/// out-of-range values absorbed by the blender's clamp.
pub fn score_candidate(cf_score: f32, features: &CandidateFeatures) -> ScoreOutcome {
    let inputs = [
        ("cf_score", cf_score),
        ("genre_overlap_score", features.genre_overlap_score),
        ("collaborative_score", features.collaborative_score),
        ("popularity_percentile", features.popularity_percentile),
        ("year_preference_score", features.year_preference_score),
    ];
    for (name, value) in inputs {
        if !value.is_finite() {
            return ScoreOutcome::Defaulted {
                value: DEFAULT_SCORE,
                cause: format!("non-finite {}: {}", name, value),
            };
        }
    }

    ScoreOutcome::Computed(blend::blend(
        cf_score,
        features.genre_overlap_score,
        features.collaborative_score,
        features.popularity_percentile,
        features.year_preference_score,
    ))
}

/// The MLScorer service backed by a loaded CF model.
///
/// The model is constructed once at startup and never mutated, so the
/// service shares it across concurrent requests without locking.
pub struct MLScorerService {
    model: Arc<CfModel>,
}

impl MLScorerService {
    pub fn new(model: Arc<CfModel>) -> Self {
        Self { model }
    }
}

#[tonic::async_trait]
impl MlScorer for MLScorerService {
    async fn score_candidates(
        &self,
        request: Request<ScoreRequest>,
    ) -> Result<Response<ScoreResponse>, Status> {
        let req = request.into_inner();
        let user_id = req.user_id;
        let features = req.features;

        debug!("Scoring {} candidates for user {}", features.len(), user_id);

        if features.is_empty() {
            warn!("Received empty features list for user {}", user_id);
            return Ok(Response::new(ScoreResponse { scores: vec![] }));
        }

        // One neighbor query for the whole batch. The scan is CPU-bound,
        // so it runs off the async worker threads; a panic in it fails the
        // request as a whole.
        let movie_ids: Vec<u32> = features.iter().map(|f| f.movie_id).collect();
        let model = Arc::clone(&self.model);
        let cf_scores = tokio::task::spawn_blocking(move || model.batch_score(user_id, &movie_ids))
            .await
            .map_err(|e| {
                error!("CF scoring task failed for user {}: {}", user_id, e);
                Status::internal("Internal server error")
            })?;

        let mut scores = Vec::with_capacity(features.len());
        for (candidate, &cf_score) in features.iter().zip(&cf_scores) {
            let outcome = score_candidate(cf_score, candidate);
            if let ScoreOutcome::Defaulted { cause, .. } = &outcome {
                error!(
                    "Error scoring candidate movie_id={}: {}",
                    candidate.movie_id, cause
                );
            }
            scores.push(outcome.value());
        }

        let avg = scores.iter().sum::<f32>() / scores.len() as f32;
        info!(
            "Scored {} candidates for user {} (avg: {:.3})",
            scores.len(),
            user_id,
            avg
        );
        Ok(Response::new(ScoreResponse { scores }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cf_model::{NeighborIndex, build_user_item_matrix, types::Metric, RatingRecord};

    fn record(user_id: u32, movie_id: u32, rating: f32) -> RatingRecord {
        RatingRecord {
            user_id,
            movie_id,
            rating,
            timestamp: 0,
        }
    }

    fn test_service() -> MLScorerService {
        let records = vec![
            record(1, 10, 5.0),
            record(1, 20, 4.0),
            record(2, 10, 5.0),
            record(2, 20, 4.0),
            record(2, 30, 5.0),
            record(3, 10, 1.0),
            record(3, 30, 2.0),
        ];
        let (matrix, users, movies) = build_user_item_matrix(&records);
        let index = NeighborIndex::fit(&matrix, 3, Metric::Cosine);
        MLScorerService::new(Arc::new(CfModel::new(matrix, index, users, movies)))
    }

    fn candidate(movie_id: u32, feature_value: f32) -> CandidateFeatures {
        CandidateFeatures {
            movie_id,
            genre_overlap_score: feature_value,
            collaborative_score: feature_value,
            popularity_percentile: feature_value,
            year_preference_score: feature_value,
        }
    }

    #[tokio::test]
    async fn test_response_matches_request_length_and_order() {
        let service = test_service();
        let request = Request::new(ScoreRequest {
            user_id: 1,
            features: vec![candidate(30, 0.8), candidate(10, 0.2), candidate(999, 0.5)],
        });

        let scores = service
            .score_candidates(request)
            .await
            .unwrap()
            .into_inner()
            .scores;

        assert_eq!(scores.len(), 3);
        let model_scores = {
            let service = test_service();
            let model = Arc::clone(&service.model);
            model.batch_score(1, &[30, 10, 999])
        };
        assert!((scores[0] - blend::blend(model_scores[0], 0.8, 0.8, 0.8, 0.8)).abs() < 1e-6);
        assert!((scores[1] - blend::blend(model_scores[1], 0.2, 0.2, 0.2, 0.2)).abs() < 1e-6);
        assert!((scores[2] - blend::blend(0.0, 0.5, 0.5, 0.5, 0.5)).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_empty_batch_returns_empty_scores() {
        let service = test_service();
        let request = Request::new(ScoreRequest {
            user_id: 1,
            features: vec![],
        });
        let scores = service
            .score_candidates(request)
            .await
            .unwrap()
            .into_inner()
            .scores;
        assert!(scores.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_user_still_scores_from_features() {
        let service = test_service();
        let request = Request::new(ScoreRequest {
            user_id: 999,
            features: vec![candidate(10, 1.0)],
        });
        let scores = service
            .score_candidates(request)
            .await
            .unwrap()
            .into_inner()
            .scores;
        // CF contributes 0.0, the remaining 60% of weight comes from features
        assert!((scores[0] - 0.6).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_one_bad_candidate_defaults_without_failing_batch() {
        let service = test_service();
        let mut bad = candidate(10, 0.5);
        bad.genre_overlap_score = f32::NAN;
        let request = Request::new(ScoreRequest {
            user_id: 999,
            features: vec![candidate(10, 1.0), bad, candidate(20, 0.0)],
        });

        let scores = service
            .score_candidates(request)
            .await
            .unwrap()
            .into_inner()
            .scores;

        assert_eq!(scores.len(), 3);
        assert!((scores[0] - 0.6).abs() < 1e-6);
        assert_eq!(scores[1], DEFAULT_SCORE);
        assert_eq!(scores[2], 0.0);
    }

    #[test]
    fn test_score_outcome_distinguishes_defaulted() {
        match score_candidate(0.5, &candidate(10, 0.5)) {
            ScoreOutcome::Computed(v) => assert!((v - 0.5).abs() < 1e-6),
            other => panic!("expected computed outcome, got {other:?}"),
        }

        let mut bad = candidate(10, 0.5);
        bad.popularity_percentile = f32::INFINITY;
        match score_candidate(0.5, &bad) {
            ScoreOutcome::Defaulted { value, cause } => {
                assert_eq!(value, DEFAULT_SCORE);
                assert!(cause.contains("popularity_percentile"));
            }
            other => panic!("expected defaulted outcome, got {other:?}"),
        }
    }
}
