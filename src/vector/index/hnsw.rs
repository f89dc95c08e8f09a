//! HNSW (Hierarchical Navigable Small World) vector index implementation.
//!
//! HNSW builds a multi-layer proximity graph where each layer contains a
//! subset of the nodes from the layer below. Searches enter at the sparse top
//! layer, greedily descend to layer 0, and finish with a beam search there.
//!
//! An [`HnswIndex`] is immutable once built. It is `Send + Sync`, so a single
//! index can serve any number of concurrent queries without locking.
//!
//! ```
//! use annex::vector::core::point::Point;
//! use annex::vector::core::vector::Vector;
//! use annex::vector::index::config::HnswConfig;
//! use annex::vector::index::hnsw::HnswIndex;
//!
//! let points = Point::from_pairs(vec![
//!     ("a", Vector::new(vec![0.0, 0.0])),
//!     ("b", Vector::new(vec![1.0, 1.0])),
//!     ("c", Vector::new(vec![5.0, 5.0])),
//! ]);
//! let index = HnswIndex::build(points, HnswConfig::default()).unwrap();
//!
//! let result = index.search(&[0.9, 0.9], 2).unwrap();
//! assert_eq!(index.point(result.neighbors[0].handle).unwrap().id, "b");
//! ```

pub mod builder;
pub mod graph;
pub mod search;
pub mod searcher;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::vector::core::point::{Handle, Point};
use crate::vector::index::config::HnswConfig;
use crate::vector::index::hnsw::builder::HnswIndexBuilder;
use crate::vector::index::hnsw::graph::HnswGraph;
use crate::vector::index::hnsw::searcher::HnswSearcher;
use crate::vector::search::SearchResult;

/// A built HNSW index: the points it owns plus their layered graph.
#[derive(Debug, Clone)]
pub struct HnswIndex {
    config: HnswConfig,
    dimension: usize,
    points: Vec<Point>,
    graph: HnswGraph,
}

/// Summary statistics for a built index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HnswStats {
    /// Number of indexed points.
    pub total_points: usize,
    /// Vector dimension.
    pub dimension: usize,
    /// Number of layers (max level + 1).
    pub levels: usize,
    /// Entry point handle.
    pub entry_point: Option<Handle>,
    /// Nodes present per layer, layer 0 first.
    pub layer_sizes: Vec<usize>,
    /// Mean out-degree at layer 0.
    pub avg_degree_layer0: f64,
    /// Rough in-memory footprint.
    pub memory_usage_bytes: usize,
}

impl HnswIndex {
    /// Build an index over `points` with a builder seeded from `config.seed`.
    pub fn build(points: Vec<Point>, config: HnswConfig) -> Result<Self> {
        HnswIndexBuilder::new(config)?.build(points)
    }

    pub(crate) fn from_parts(
        config: HnswConfig,
        dimension: usize,
        points: Vec<Point>,
        graph: HnswGraph,
    ) -> Self {
        Self {
            config,
            dimension,
            points,
            graph,
        }
    }

    /// Get the configuration the index was built with.
    pub fn config(&self) -> &HnswConfig {
        &self.config
    }

    /// Vector dimension shared by every point.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of indexed points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the index holds no points. Never true for a built index.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// All points, ordered by handle.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Look up a point by handle.
    pub fn point(&self, handle: Handle) -> Option<&Point> {
        self.points.get(handle)
    }

    /// The underlying graph.
    pub fn graph(&self) -> &HnswGraph {
        &self.graph
    }

    /// Entry point handle.
    pub fn entry_point(&self) -> Option<Handle> {
        self.graph.entry_point()
    }

    /// Highest layer in the graph.
    pub fn max_level(&self) -> usize {
        self.graph.max_level()
    }

    /// Neighbors of `handle` at `layer`.
    pub fn neighbors(&self, handle: Handle, layer: usize) -> &[Handle] {
        self.graph.neighbors(handle, layer)
    }

    /// Create a searcher using the configured `ef_search`.
    pub fn searcher(&self) -> HnswSearcher<'_> {
        HnswSearcher::new(self)
    }

    /// Find the `k` nearest points to `query`.
    pub fn search(&self, query: &[f32], k: usize) -> Result<SearchResult> {
        self.searcher().search(query, k)
    }

    /// Find the `k` nearest points to `query` with an explicit beam width.
    pub fn search_with_ef(&self, query: &[f32], k: usize, ef: usize) -> Result<SearchResult> {
        let mut searcher = self.searcher();
        searcher.set_ef_search(ef);
        searcher.search(query, k)
    }

    /// Run every query independently, in parallel, preserving input order.
    pub fn batch_search<Q>(&self, queries: &[Q], k: usize) -> Vec<Result<SearchResult>>
    where
        Q: AsRef<[f32]> + Sync,
    {
        self.searcher().batch_search(queries, k)
    }

    /// Summarize the index.
    pub fn stats(&self) -> HnswStats {
        let total_points = self.len();
        let layer0_edges = self.graph.edge_count(0);
        let total_edges: usize = (0..=self.max_level())
            .map(|level| self.graph.edge_count(level))
            .sum();

        let avg_degree_layer0 = if total_points == 0 {
            0.0
        } else {
            layer0_edges as f64 / total_points as f64
        };

        // Estimate memory usage
        let vector_size = total_points * self.dimension * 4; // 4 bytes per f32
        let graph_size = total_edges * std::mem::size_of::<Handle>();
        let id_size: usize = self.points.iter().map(|p| p.id.len()).sum();

        HnswStats {
            total_points,
            dimension: self.dimension,
            levels: self.max_level() + 1,
            entry_point: self.entry_point(),
            layer_sizes: self.graph.layer_sizes(),
            avg_degree_layer0,
            memory_usage_bytes: vector_size + graph_size + id_size,
        }
    }

    /// Check the graph's structural invariants.
    pub fn validate(&self) -> Result<()> {
        self.graph.validate(&self.config)
    }
}
