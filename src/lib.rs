//! # Annex
//!
//! In-memory approximate nearest neighbor search over Euclidean vectors,
//! built on hierarchical navigable small world (HNSW) graphs.
//!
//! ## Features
//!
//! - Pure Rust implementation
//! - Deterministic, seedable index construction
//! - Diversity-pruned neighbor selection
//! - Lock-free parallel querying of a built index
//! - Cooperative cancellation and request deadlines
//!
//! The usual flow is build-then-query: hand a dataset to
//! [`vector::HnswIndex::build`] (or a whole request to
//! [`engine::AnnEngine::execute`]) and run queries against the immutable
//! result.

pub mod cli;
pub mod engine;
pub mod error;
pub mod util;
pub mod vector;

pub mod prelude {
    pub use crate::engine::{AnnEngine, AnnRequest, AnnResponse, EngineConfig, VectorData};
    pub use crate::error::{AnnexError, Result};
    pub use crate::util::cancel::CancellationToken;
    pub use crate::vector::{DistanceMetric, HnswConfig, HnswIndex, Point, SearchResult, Vector};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
