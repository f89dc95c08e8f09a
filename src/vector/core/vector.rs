//! Core vector data structure.

use serde::{Deserialize, Serialize};

use crate::error::{AnnexError, Result};

/// A dense vector of `f32` components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Vector {
    /// The vector components.
    pub data: Vec<f32>,
}

impl Vector {
    /// Create a new vector from its components.
    pub fn new(data: Vec<f32>) -> Self {
        Self { data }
    }

    /// Get the dimensionality of this vector.
    pub fn dimension(&self) -> usize {
        self.data.len()
    }

    /// Borrow the components.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Validate that this vector has the expected dimension.
    pub fn validate_dimension(&self, expected_dim: usize) -> Result<()> {
        if self.data.len() != expected_dim {
            return Err(AnnexError::dimension_mismatch(expected_dim, self.data.len()));
        }
        Ok(())
    }

    /// Check if this vector contains any NaN or infinite values.
    pub fn is_valid(&self) -> bool {
        self.data.iter().all(|x| x.is_finite())
    }
}

impl From<Vec<f32>> for Vector {
    fn from(data: Vec<f32>) -> Self {
        Self::new(data)
    }
}
