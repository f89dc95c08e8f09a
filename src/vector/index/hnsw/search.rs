//! Greedy beam search over a single graph layer.
//!
//! Both the builder and the query engine route every graph walk through
//! [`LayerSearch::search_layer`]; they differ only in the beam width and the
//! entry set they pass in.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use bit_vec::BitVec;

use crate::error::Result;
use crate::util::cancel::CancellationToken;
use crate::vector::core::distance::DistanceMetric;
use crate::vector::core::point::{Handle, Point};
use crate::vector::index::hnsw::graph::HnswGraph;

/// Node expansions between two cancellation checks.
const CANCEL_CHECK_INTERVAL: usize = 64;

/// Priority queue entry for HNSW search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Distance to the query vector.
    pub distance: f32,
    /// Node handle in the graph.
    pub handle: Handle,
}

impl Candidate {
    pub fn new(handle: Handle, distance: f32) -> Self {
        Self { distance, handle }
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    /// Ascending distance, handle as tie-break.
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| self.handle.cmp(&other.handle))
    }
}

/// Read-only view over a graph and the points it indexes.
pub struct LayerSearch<'a> {
    graph: &'a HnswGraph,
    points: &'a [Point],
    metric: DistanceMetric,
    token: Option<&'a CancellationToken>,
}

impl<'a> LayerSearch<'a> {
    pub fn new(graph: &'a HnswGraph, points: &'a [Point], metric: DistanceMetric) -> Self {
        Self {
            graph,
            points,
            metric,
            token: None,
        }
    }

    /// Poll `token` while walking the graph.
    pub fn with_cancellation(mut self, token: Option<&'a CancellationToken>) -> Self {
        self.token = token;
        self
    }

    /// Distance from `query` to the point behind `handle`.
    #[inline]
    pub fn distance(&self, query: &[f32], handle: Handle) -> f32 {
        self.metric
            .distance_unchecked(query, &self.points[handle].vector.data)
    }

    /// Collect up to `ef` nodes of `layer` closest to `query`, starting from
    /// `entry_points`.
    ///
    /// Returns candidates sorted by ascending distance, handle as tie-break.
    pub fn search_layer(
        &self,
        query: &[f32],
        entry_points: &[Handle],
        ef: usize,
        layer: usize,
    ) -> Result<Vec<Candidate>> {
        let ef = ef.max(1);
        let mut visited = BitVec::from_elem(self.graph.len(), false);
        let mut candidates = BinaryHeap::new(); // Min-heap of nodes to expand
        let mut results: BinaryHeap<Candidate> = BinaryHeap::with_capacity(ef + 1); // Max-heap, worst on top

        for &entry in entry_points {
            if entry >= self.graph.len() || visited.get(entry).unwrap_or(true) {
                continue;
            }
            visited.set(entry, true);

            let candidate = Candidate::new(entry, self.distance(query, entry));
            candidates.push(Reverse(candidate));
            results.push(candidate);
            if results.len() > ef {
                results.pop();
            }
        }

        let mut expansions = 0usize;
        while let Some(Reverse(current)) = candidates.pop() {
            if results.len() >= ef
                && let Some(worst) = results.peek()
                && current.distance > worst.distance
            {
                break;
            }

            expansions += 1;
            if expansions % CANCEL_CHECK_INTERVAL == 0
                && let Some(token) = self.token
            {
                token.check()?;
            }

            for &neighbor in self.graph.neighbors(current.handle, layer) {
                if visited.get(neighbor).unwrap_or(true) {
                    continue;
                }
                visited.set(neighbor, true);

                let candidate = Candidate::new(neighbor, self.distance(query, neighbor));
                let admit = results.len() < ef || results.peek().is_some_and(|worst| candidate < *worst);
                if admit {
                    candidates.push(Reverse(candidate));
                    results.push(candidate);
                    if results.len() > ef {
                        results.pop(); // Remove farthest
                    }
                }
            }
        }

        // Ascending by distance
        Ok(results.into_sorted_vec())
    }

    /// Walk from `entry` down through layers `from_level..=to_level` with a beam
    /// width of one, returning the closest node found in `to_level`.
    pub fn greedy_descend(
        &self,
        query: &[f32],
        entry: Handle,
        from_level: usize,
        to_level: usize,
    ) -> Result<Candidate> {
        let mut best = Candidate::new(entry, self.distance(query, entry));
        if from_level < to_level {
            return Ok(best);
        }

        for layer in (to_level..=from_level).rev() {
            if let Some(closest) = self
                .search_layer(query, &[best.handle], 1, layer)?
                .into_iter()
                .next()
            {
                best = closest;
            }
        }

        Ok(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::core::vector::Vector;

    /// Points on a line at x = 0..n, chained at layer 0.
    fn line(n: usize) -> (HnswGraph, Vec<Point>) {
        let points: Vec<Point> = (0..n)
            .map(|i| Point::new(format!("p{i}"), i, Vector::new(vec![i as f32])))
            .collect();
        let mut graph = HnswGraph::with_capacity(n);
        for _ in 0..n {
            graph.add_node(0);
        }
        graph.set_entry_point(0, 0);
        for i in 0..n {
            let mut neighbors = Vec::new();
            if i > 0 {
                neighbors.push(i - 1);
            }
            if i + 1 < n {
                neighbors.push(i + 1);
            }
            graph.set_neighbors(i, 0, neighbors);
        }
        (graph, points)
    }

    #[test]
    fn test_search_candidate_ordering() {
        let mut candidates = [
            Candidate::new(1, 0.5),
            Candidate::new(3, 0.2),
            Candidate::new(2, 0.2),
            Candidate::new(0, 0.8),
        ];

        candidates.sort();

        let handles: Vec<_> = candidates.iter().map(|c| c.handle).collect();
        assert_eq!(handles, vec![2, 3, 1, 0]);
    }

    #[test]
    fn test_search_layer_walks_to_query() {
        let (graph, points) = line(20);
        let search = LayerSearch::new(&graph, &points, DistanceMetric::SquaredEuclidean);

        let results = search.search_layer(&[12.2], &[0], 3, 0).unwrap();
        let handles: Vec<_> = results.iter().map(|c| c.handle).collect();
        assert_eq!(handles, vec![12, 13, 11]);
        assert!(results.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[test]
    fn test_search_layer_beam_width_bounds_result() {
        let (graph, points) = line(10);
        let search = LayerSearch::new(&graph, &points, DistanceMetric::SquaredEuclidean);

        let results = search.search_layer(&[4.0], &[9], 4, 0).unwrap();
        assert_eq!(results.len(), 4);
        assert_eq!(results[0].handle, 4);
        assert_eq!(results[0].distance, 0.0);
    }

    #[test]
    fn test_greedy_descend_single_layer() {
        let (graph, points) = line(10);
        let search = LayerSearch::new(&graph, &points, DistanceMetric::SquaredEuclidean);

        let best = search.greedy_descend(&[7.1], 0, 0, 0).unwrap();
        assert_eq!(best.handle, 7);
    }

    #[test]
    fn test_cancelled_search_fails() {
        let (graph, points) = line(500);
        let token = CancellationToken::new();
        token.cancel();
        let search = LayerSearch::new(&graph, &points, DistanceMetric::SquaredEuclidean)
            .with_cancellation(Some(&token));

        assert!(search.search_layer(&[499.0], &[0], 10, 0).is_err());
    }
}
