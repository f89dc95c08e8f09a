//! Search request types.

use serde::{Deserialize, Serialize};

use crate::error::{AnnexError, Result};
use crate::vector::core::point::Point;
use crate::vector::core::vector::Vector;

fn default_k() -> usize {
    5
}

/// An identified vector, as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorData {
    pub id: String,
    pub vector: Vec<f32>,
}

impl VectorData {
    pub fn new<S: Into<String>>(id: S, vector: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            vector,
        }
    }
}

/// A dataset to index and a batch of queries to run against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnRequest {
    /// Points to index, in handle order.
    pub dataset: Vec<VectorData>,
    /// Queries, answered in input order.
    pub query: Vec<VectorData>,
    /// Neighbors per query.
    #[serde(default = "default_k")]
    pub k: usize,
}

impl AnnRequest {
    pub fn new(dataset: Vec<VectorData>, query: Vec<VectorData>, k: usize) -> Self {
        Self { dataset, query, k }
    }

    /// Check every dataset and query vector against the first dataset vector,
    /// and reject NaN or infinite components.
    ///
    /// Returns the shared dimension.
    pub fn validate_dimensions(&self) -> Result<usize> {
        let first = self.dataset.first().ok_or(AnnexError::EmptyDataset)?;
        let dimension = first.vector.len();

        for item in self.dataset.iter().chain(self.query.iter()) {
            if item.vector.len() != dimension {
                return Err(AnnexError::dimension_mismatch(dimension, item.vector.len()));
            }
        }
        if let Some(item) = self
            .dataset
            .iter()
            .chain(self.query.iter())
            .find(|item| !item.vector.iter().all(|x| x.is_finite()))
        {
            return Err(AnnexError::invalid_argument(format!(
                "vector {} has a non-finite component",
                item.id
            )));
        }

        Ok(dimension)
    }

    /// Dataset entries as points with positional handles.
    pub fn points(&self) -> Vec<Point> {
        Point::from_pairs(
            self.dataset
                .iter()
                .map(|item| (item.id.clone(), Vector::new(item.vector.clone()))),
        )
    }
}
