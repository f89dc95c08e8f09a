//! Vector index construction and querying.
//!
//! - `config`: build and search parameters
//! - `hnsw`: the hierarchical navigable small world graph index

pub mod config;
pub mod hnsw;

pub use self::config::HnswConfig;
pub use self::hnsw::builder::HnswIndexBuilder;
pub use self::hnsw::searcher::HnswSearcher;
