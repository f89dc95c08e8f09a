//! Configuration types for HNSW indexes.

use serde::{Deserialize, Serialize};

use crate::error::{AnnexError, Result};
use crate::vector::core::distance::DistanceMetric;

/// Configuration for HNSW index construction and search.
///
/// When deserialized, `m_max0` and `ml` follow `m` unless the document sets
/// them explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "HnswConfigDocument")]
pub struct HnswConfig {
    /// Maximum number of connections per node above layer 0.
    pub m: usize,
    /// Maximum number of connections per node in layer 0 (typically 2*m).
    pub m_max0: usize,
    /// Multiplier that controls the probability of layer assignment (1/ln(m)).
    pub ml: f64,
    /// Size of the candidate set during construction.
    pub ef_construction: usize,
    /// Size of the candidate set during search.
    pub ef_search: usize,
    /// Random seed for layer assignment.
    pub seed: u64,
    /// Hard cap on the layer a point can be assigned to.
    pub max_level: usize,
    /// Distance metric to use.
    pub distance_metric: DistanceMetric,
}

impl Default for HnswConfig {
    fn default() -> Self {
        Self {
            m: 16,
            m_max0: 32,
            ml: level_multiplier(16),
            ef_construction: 200,
            ef_search: 50,
            seed: 42,
            max_level: 16,
            distance_metric: DistanceMetric::SquaredEuclidean,
        }
    }
}

/// Serialized form of [`HnswConfig`] with the derived parameters optional.
#[derive(Deserialize)]
#[serde(default)]
struct HnswConfigDocument {
    m: usize,
    m_max0: Option<usize>,
    ml: Option<f64>,
    ef_construction: usize,
    ef_search: usize,
    seed: u64,
    max_level: usize,
    distance_metric: DistanceMetric,
}

impl Default for HnswConfigDocument {
    fn default() -> Self {
        let defaults = HnswConfig::default();
        Self {
            m: defaults.m,
            m_max0: None,
            ml: None,
            ef_construction: defaults.ef_construction,
            ef_search: defaults.ef_search,
            seed: defaults.seed,
            max_level: defaults.max_level,
            distance_metric: defaults.distance_metric,
        }
    }
}

impl From<HnswConfigDocument> for HnswConfig {
    fn from(doc: HnswConfigDocument) -> Self {
        Self {
            m: doc.m,
            m_max0: doc.m_max0.unwrap_or(doc.m.saturating_mul(2)),
            ml: doc.ml.unwrap_or_else(|| level_multiplier(doc.m)),
            ef_construction: doc.ef_construction,
            ef_search: doc.ef_search,
            seed: doc.seed,
            max_level: doc.max_level,
            distance_metric: doc.distance_metric,
        }
    }
}

impl HnswConfig {
    /// Create a configuration with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the M parameter; also resets `m_max0` and `ml` to match.
    pub fn with_m(mut self, m: usize) -> Self {
        self.m = m;
        self.m_max0 = m * 2;
        self.ml = level_multiplier(m);
        self
    }

    /// Set the ef_construction parameter.
    pub fn with_ef_construction(mut self, ef_construction: usize) -> Self {
        self.ef_construction = ef_construction;
        self
    }

    /// Set the ef_search parameter.
    pub fn with_ef_search(mut self, ef_search: usize) -> Self {
        self.ef_search = ef_search;
        self
    }

    /// Set the random seed used for layer assignment.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the distance metric.
    pub fn with_distance_metric(mut self, metric: DistanceMetric) -> Self {
        self.distance_metric = metric;
        self
    }

    /// Degree bound for `layer`.
    pub fn max_connections(&self, layer: usize) -> usize {
        if layer == 0 { self.m_max0 } else { self.m }
    }

    /// Validate the configuration parameters.
    pub fn validate(&self) -> Result<()> {
        if self.m < 2 {
            return Err(AnnexError::invalid_config("M must be >= 2"));
        }
        if self.m_max0 < self.m {
            return Err(AnnexError::invalid_config("m_max0 must be >= M"));
        }
        if self.ef_construction == 0 {
            return Err(AnnexError::invalid_config("ef_construction must be > 0"));
        }
        if self.ef_search == 0 {
            return Err(AnnexError::invalid_config("ef_search must be > 0"));
        }
        if !(self.ml.is_finite() && self.ml > 0.0) {
            return Err(AnnexError::invalid_config("ml must be finite and > 0"));
        }
        Ok(())
    }
}

/// Normalization factor for the exponential layer distribution.
pub fn level_multiplier(m: usize) -> f64 {
    1.0 / (m.max(2) as f64).ln()
}
