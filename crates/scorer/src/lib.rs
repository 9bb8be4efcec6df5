//! gRPC scoring service for the ReelRecs recommendation engine.
//!
//! Exposes the collaborative filtering model over the `MLScorer` gRPC
//! contract. The recommendation pipeline sends one request per user with
//! the candidate set and its precomputed feature scores; this service
//! blends them with the CF prediction and returns one score per candidate.

pub mod service;

// Include the generated protobuf code
pub mod recommendations {
    tonic::include_proto!("recommendations");
}

pub use service::{MLScorerService, ScoreOutcome};
