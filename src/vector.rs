//! Approximate nearest neighbor search over Euclidean vectors.
//!
//! # Module Structure
//!
//! - `core`: Core data structures (vector, point, distance)
//! - `index`: Index configuration and the HNSW graph index
//! - `search`: Search result types

pub mod core;
pub mod index;
pub mod search;

pub use self::core::distance::DistanceMetric;
pub use self::core::point::{Handle, Point};
pub use self::core::vector::Vector;
pub use self::index::config::HnswConfig;
pub use self::index::hnsw::{HnswIndex, HnswStats};
pub use self::search::{ScoredPoint, SearchResult};
