//! Points: vectors paired with their external id and internal handle.

use serde::{Deserialize, Serialize};

use crate::error::{AnnexError, Result};
use crate::vector::core::vector::Vector;

/// Dense internal handle in `[0, N)`.
pub type Handle = usize;

/// A dataset entry as stored by an index.
///
/// The external `id` is opaque to the graph; only `handle` is used while
/// building and searching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Caller-supplied identifier.
    pub id: String,
    /// Position of this point in the dataset.
    pub handle: Handle,
    /// The point's coordinates.
    pub vector: Vector,
}

impl Point {
    /// Create a new point.
    pub fn new<S: Into<String>>(id: S, handle: Handle, vector: Vector) -> Self {
        Self {
            id: id.into(),
            handle,
            vector,
        }
    }

    /// Assign positional handles to `(id, vector)` pairs.
    pub fn from_pairs<I, S>(pairs: I) -> Vec<Point>
    where
        I: IntoIterator<Item = (S, Vector)>,
        S: Into<String>,
    {
        pairs
            .into_iter()
            .enumerate()
            .map(|(handle, (id, vector))| Point::new(id, handle, vector))
            .collect()
    }
}

/// Check that every vector shares the first one's length and return it.
///
/// Fails with [`AnnexError::EmptyDataset`] for an empty slice.
pub fn common_dimension(points: &[Point]) -> Result<usize> {
    let first = points.first().ok_or(AnnexError::EmptyDataset)?;
    let dimension = first.vector.dimension();
    for point in points {
        point.vector.validate_dimension(dimension)?;
    }
    Ok(dimension)
}
