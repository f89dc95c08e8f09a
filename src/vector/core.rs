//! Core data structures for vector search.
//!
//! Vector representations, dataset points and the distance metric.

pub mod distance;
pub mod point;
pub mod vector;
