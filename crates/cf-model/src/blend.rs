//! Final score blending.
//!
//! Combines the CF prediction with the four precomputed candidate features
//! using fixed weights that sum to 1.0, then clamps into [0, 1]. Inputs
//! outside [0, 1] are absorbed by the clamp rather than rejected.

pub const CF_WEIGHT: f32 = 0.40;
pub const GENRE_OVERLAP_WEIGHT: f32 = 0.25;
pub const COLLABORATIVE_WEIGHT: f32 = 0.20;
pub const POPULARITY_WEIGHT: f32 = 0.10;
pub const YEAR_PREFERENCE_WEIGHT: f32 = 0.05;

/// Weighted blend of the CF score and the candidate's feature scores
pub fn blend(
    cf_score: f32,
    genre_overlap: f32,
    collaborative: f32,
    popularity_percentile: f32,
    year_preference: f32,
) -> f32 {
    let combined = CF_WEIGHT * cf_score
        + GENRE_OVERLAP_WEIGHT * genre_overlap
        + COLLABORATIVE_WEIGHT * collaborative
        + POPULARITY_WEIGHT * popularity_percentile
        + YEAR_PREFERENCE_WEIGHT * year_preference;
    combined.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_sum_to_one() {
        let total = CF_WEIGHT
            + GENRE_OVERLAP_WEIGHT
            + COLLABORATIVE_WEIGHT
            + POPULARITY_WEIGHT
            + YEAR_PREFERENCE_WEIGHT;
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_endpoints() {
        assert_eq!(blend(1.0, 1.0, 1.0, 1.0, 1.0), 1.0);
        assert_eq!(blend(0.0, 0.0, 0.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn test_weighted_combination() {
        let score = blend(1.0, 0.0, 0.0, 0.0, 0.0);
        assert!((score - CF_WEIGHT).abs() < 1e-6);

        let score = blend(0.5, 0.5, 0.5, 0.5, 0.5);
        assert!((score - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_out_of_range_inputs_are_clamped() {
        assert_eq!(blend(3.0, 2.0, 2.0, 2.0, 2.0), 1.0);
        assert_eq!(blend(-5.0, -1.0, 0.0, 0.0, 0.0), 0.0);
    }
}
