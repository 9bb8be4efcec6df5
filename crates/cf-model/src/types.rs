//! Core domain types shared by the trainer and the scoring service.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

use crate::error::ModelError;

/// Unique identifier for a user (1-6040 in MovieLens 1M)
pub type UserId = u32;

/// Unique identifier for a movie (varies in MovieLens 1M)
pub type MovieId = u32;

/// A single historical rating event.
///
/// One record per (user, movie, time) event; the same user/movie pair may
/// appear more than once in a raw ratings stream.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RatingRecord {
    pub user_id: UserId,
    pub movie_id: MovieId,
    /// Rating value from 1.0 to 5.0
    pub rating: f32,
    /// Unix timestamp when the rating was made
    pub timestamp: i64,
}

/// Distance metric used by the neighbor index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Metric {
    Cosine,
    Euclidean,
}

impl Default for Metric {
    fn default() -> Self {
        Metric::Cosine
    }
}

impl FromStr for Metric {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cosine" => Ok(Metric::Cosine),
            "euclidean" => Ok(Metric::Euclidean),
            _ => Err(ModelError::InvalidValue {
                field: "metric".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Metric::Cosine => write!(f, "cosine"),
            Metric::Euclidean => write!(f, "euclidean"),
        }
    }
}

/// Mapping from an external ID to a matrix row/column position.
///
/// Positions are assigned in order of first appearance, forming a bijection
/// between observed IDs and `[0, len)`. The map is fixed at build time and
/// persisted alongside the matrix; an absent ID is the normal
/// "unknown entity" case, not an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdMap {
    map: HashMap<u32, usize>,
}

impl IdMap {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Return the position for `id`, assigning the next free position if
    /// this is the first time the ID has been seen.
    pub fn assign(&mut self, id: u32) -> usize {
        let next = self.map.len();
        *self.map.entry(id).or_insert(next)
    }

    /// Look up the position for an ID, `None` if it was never observed
    pub fn position(&self, id: u32) -> Option<usize> {
        self.map.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_first_appearance_order() {
        let mut map = IdMap::new();
        assert_eq!(map.assign(42), 0);
        assert_eq!(map.assign(7), 1);
        // Re-assigning an existing ID keeps its original position
        assert_eq!(map.assign(42), 0);
        assert_eq!(map.assign(100), 2);
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn test_position_of_unknown_id() {
        let mut map = IdMap::new();
        map.assign(1);
        assert_eq!(map.position(1), Some(0));
        assert_eq!(map.position(999), None);
    }

    #[test]
    fn test_metric_parsing() {
        assert_eq!("cosine".parse::<Metric>().unwrap(), Metric::Cosine);
        assert_eq!("Euclidean".parse::<Metric>().unwrap(), Metric::Euclidean);
        assert!("manhattan".parse::<Metric>().is_err());
    }
}
