//! HNSW (Hierarchical Navigable Small World) index builder.

use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::error::{AnnexError, Result};
use crate::util::cancel::CancellationToken;
use crate::vector::core::distance::DistanceMetric;
use crate::vector::core::point::{Handle, Point, common_dimension};
use crate::vector::index::config::HnswConfig;
use crate::vector::index::hnsw::HnswIndex;
use crate::vector::index::hnsw::graph::HnswGraph;
use crate::vector::index::hnsw::search::{Candidate, LayerSearch};

/// Builder for HNSW indexes.
///
/// Points are inserted one at a time in input order. Layer assignment draws
/// from an injected, seedable generator so identical input always produces an
/// identical graph.
pub struct HnswIndexBuilder {
    config: HnswConfig,
    rng: StdRng,
    token: Option<CancellationToken>,
}

impl HnswIndexBuilder {
    /// Create a new builder seeded from `config.seed`.
    pub fn new(config: HnswConfig) -> Result<Self> {
        config.validate()?;
        let rng = StdRng::seed_from_u64(config.seed);
        Ok(Self {
            config,
            rng,
            token: None,
        })
    }

    /// Replace the layer-assignment generator.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Abort the build when `token` trips.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Get the configuration.
    pub fn config(&self) -> &HnswConfig {
        &self.config
    }

    /// Build an index over `points`.
    ///
    /// Fails with [`AnnexError::EmptyDataset`] for no points, with
    /// [`AnnexError::DimensionMismatch`] for ragged vectors and with
    /// [`AnnexError::InvalidArgument`] for NaN or infinite components. All
    /// checks run before any graph work.
    pub fn build(mut self, points: Vec<Point>) -> Result<HnswIndex> {
        let dimension = common_dimension(&points)?;
        if let Some(point) = points.iter().find(|point| !point.vector.is_valid()) {
            return Err(AnnexError::invalid_argument(format!(
                "point {} has a non-finite component",
                point.id
            )));
        }
        if let Some((position, point)) = points
            .iter()
            .enumerate()
            .find(|(position, point)| point.handle != *position)
        {
            return Err(AnnexError::invalid_argument(format!(
                "point {} at position {position} has handle {}",
                point.id, point.handle
            )));
        }

        let start = Instant::now();
        debug!(
            points = points.len(),
            dimension,
            m = self.config.m,
            ef_construction = self.config.ef_construction,
            "building HNSW graph"
        );

        let mut graph = HnswGraph::with_capacity(points.len());
        for handle in 0..points.len() {
            if let Some(token) = &self.token
                && let Err(err) = token.check()
            {
                warn!(inserted = handle, total = points.len(), "HNSW build aborted");
                return Err(err);
            }
            self.insert(&mut graph, &points, handle)?;
        }

        info!(
            points = points.len(),
            levels = graph.max_level() + 1,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "HNSW graph built"
        );

        Ok(HnswIndex::from_parts(self.config, dimension, points, graph))
    }

    /// Randomly select a layer for a new node using the ml parameter.
    fn select_level(&mut self) -> usize {
        // 1 - [0, 1) keeps the argument of ln away from zero.
        let uniform: f64 = 1.0 - self.rng.random::<f64>();
        let level = (-uniform.ln() * self.config.ml).floor();
        (level as usize).min(self.config.max_level)
    }

    /// Insert the point at `handle` into the graph.
    fn insert(&mut self, graph: &mut HnswGraph, points: &[Point], handle: Handle) -> Result<()> {
        let drawn = self.select_level();

        let Some(entry_point) = graph.entry_point() else {
            let node = graph.add_node(drawn);
            graph.set_entry_point(node, drawn);
            return Ok(());
        };

        let top = graph.max_level();
        let level = drawn.min(top + 1);
        let node = graph.add_node(level);
        if node != handle {
            return Err(AnnexError::internal(format!(
                "graph handle {node} diverged from point handle {handle}"
            )));
        }

        let metric = self.config.distance_metric;
        let query = points[handle].vector.as_slice();

        // Localize the entry point in the layers above the new node.
        let mut entry_points = {
            let search = LayerSearch::new(graph, points, metric);
            let closest = if top > level {
                search.greedy_descend(query, entry_point, top, level + 1)?
            } else {
                Candidate::new(entry_point, search.distance(query, entry_point))
            };
            vec![closest.handle]
        };

        for layer in (0..=level.min(top)).rev() {
            let candidates: Vec<Candidate> = LayerSearch::new(graph, points, metric)
                .search_layer(query, &entry_points, self.config.ef_construction, layer)?
                .into_iter()
                .filter(|candidate| candidate.handle != handle)
                .collect();

            let selected = select_neighbors_heuristic(points, metric, &candidates, self.config.m);
            graph.set_neighbors(handle, layer, selected.clone());

            let max_connections = self.config.max_connections(layer);
            for &neighbor in &selected {
                let degree = graph.push_neighbor(neighbor, layer, handle);
                if degree > max_connections {
                    prune_connections(graph, points, metric, neighbor, layer, max_connections);
                }
            }

            if !candidates.is_empty() {
                entry_points = candidates.iter().map(|c| c.handle).collect();
            }
        }

        if level > top {
            debug!(handle, level, "new HNSW entry point");
            graph.set_entry_point(handle, level);
        }

        Ok(())
    }
}

/// Select up to `m` diverse neighbors from `candidates` (sorted ascending).
///
/// A candidate is admitted unless some already admitted neighbor is strictly
/// closer to it than the base point is.
pub(crate) fn select_neighbors_heuristic(
    points: &[Point],
    metric: DistanceMetric,
    candidates: &[Candidate],
    m: usize,
) -> Vec<Handle> {
    let mut selected: Vec<Handle> = Vec::with_capacity(m);

    for candidate in candidates {
        if selected.len() >= m {
            break;
        }
        let vector = points[candidate.handle].vector.as_slice();
        let diverse = selected.iter().all(|&kept| {
            metric.distance_unchecked(vector, points[kept].vector.as_slice()) >= candidate.distance
        });
        if diverse {
            selected.push(candidate.handle);
        }
    }

    selected
}

/// Shrink the adjacency list of `handle` at `layer` to `max_connections`.
fn prune_connections(
    graph: &mut HnswGraph,
    points: &[Point],
    metric: DistanceMetric,
    handle: Handle,
    layer: usize,
    max_connections: usize,
) {
    let base = points[handle].vector.as_slice();
    let mut candidates: Vec<Candidate> = graph
        .neighbors(handle, layer)
        .iter()
        .map(|&neighbor| {
            Candidate::new(
                neighbor,
                metric.distance_unchecked(base, points[neighbor].vector.as_slice()),
            )
        })
        .collect();
    candidates.sort();

    let kept = select_neighbors_heuristic(points, metric, &candidates, max_connections);
    graph.set_neighbors(handle, layer, kept);
}
