//! Distance metrics for vector similarity calculation.

use serde::{Deserialize, Serialize};

use crate::error::{AnnexError, Result};
use crate::util::simd::distance_wide::squared_l2_simd;

/// Euclidean-family distance metrics.
///
/// Both variants rank points identically; they differ only in the value
/// reported to the caller. The metric is fixed when an index is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Squared L2 distance, the value reported by `l2` spaces in common HNSW libraries.
    #[default]
    SquaredEuclidean,
    /// Euclidean (L2) distance
    Euclidean,
}

impl DistanceMetric {
    /// Calculate the distance between two vectors using this metric.
    pub fn distance(&self, a: &[f32], b: &[f32]) -> Result<f32> {
        if a.len() != b.len() {
            return Err(AnnexError::dimension_mismatch(a.len(), b.len()));
        }
        Ok(self.distance_unchecked(a, b))
    }

    /// Calculate the distance without checking dimensions.
    ///
    /// Callers guarantee `a.len() == b.len()`; the graph code validates this
    /// once at its entry points.
    #[inline]
    pub fn distance_unchecked(&self, a: &[f32], b: &[f32]) -> f32 {
        let squared = squared_l2_simd(a, b);
        match self {
            DistanceMetric::SquaredEuclidean => squared,
            DistanceMetric::Euclidean => squared.sqrt(),
        }
    }

    /// Get the name of this distance metric.
    pub fn name(&self) -> &'static str {
        match self {
            DistanceMetric::SquaredEuclidean => "squared_euclidean",
            DistanceMetric::Euclidean => "euclidean",
        }
    }

    /// Parse a distance metric from a string.
    pub fn parse_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "squared_euclidean" | "l2sq" | "l2" => Ok(DistanceMetric::SquaredEuclidean),
            "euclidean" => Ok(DistanceMetric::Euclidean),
            _ => Err(AnnexError::invalid_config(format!(
                "Unknown distance metric: {s}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_squared_and_plain_euclidean() {
        let a = [0.0, 0.0];
        let b = [3.0, 4.0];
        assert_eq!(
            DistanceMetric::SquaredEuclidean.distance(&a, &b).unwrap(),
            25.0
        );
        assert_eq!(DistanceMetric::Euclidean.distance(&a, &b).unwrap(), 5.0);
    }

    #[test]
    fn test_dimension_check() {
        let err = DistanceMetric::default()
            .distance(&[1.0, 2.0], &[1.0])
            .unwrap_err();
        assert!(matches!(
            err,
            AnnexError::DimensionMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_parse_str() {
        assert_eq!(
            DistanceMetric::parse_str("L2").unwrap(),
            DistanceMetric::SquaredEuclidean
        );
        assert_eq!(
            DistanceMetric::parse_str("euclidean").unwrap(),
            DistanceMetric::Euclidean
        );
        assert!(DistanceMetric::parse_str("cosine").is_err());
        assert_eq!(DistanceMetric::Euclidean.name(), "euclidean");
    }
}
