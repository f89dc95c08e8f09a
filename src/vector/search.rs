//! Search result types shared by the query engine and its callers.

use serde::{Deserialize, Serialize};

use crate::vector::core::point::Handle;

/// A single neighbor: an internal handle and its distance to the query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredPoint {
    /// Internal handle of the neighbor.
    pub handle: Handle,
    /// Distance score (lower is closer).
    pub distance: f32,
}

/// Neighbors of one query, ascending by distance with handle as tie-break.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchResult {
    /// Individual neighbors.
    pub neighbors: Vec<ScoredPoint>,
    /// Size of the layer-0 candidate set before truncation to k.
    pub candidates_examined: usize,
}

impl SearchResult {
    /// Create an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if results are empty.
    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    /// Get the number of results.
    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    /// Get the closest neighbor.
    pub fn best(&self) -> Option<&ScoredPoint> {
        self.neighbors.first()
    }

    /// Iterate over neighbors, closest first.
    pub fn iter(&self) -> std::slice::Iter<'_, ScoredPoint> {
        self.neighbors.iter()
    }

    /// Handles only, closest first.
    pub fn handles(&self) -> Vec<Handle> {
        self.neighbors.iter().map(|n| n.handle).collect()
    }
}

impl<'a> IntoIterator for &'a SearchResult {
    type Item = &'a ScoredPoint;
    type IntoIter = std::slice::Iter<'a, ScoredPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
