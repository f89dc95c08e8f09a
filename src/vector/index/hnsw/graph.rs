use crate::error::{AnnexError, Result};
use crate::vector::core::point::Handle;
use crate::vector::index::config::HnswConfig;

/// Represents the HNSW graph structure.
///
/// This structure holds the connectivity information between points in the index.
/// It tracks the entry point and the adjacency list of every node at every layer
/// the node belongs to.
#[derive(Debug, Clone, Default)]
pub struct HnswGraph {
    /// Entry point handle.
    /// This is the starting point for searches, the node present in the highest level.
    entry_point: Option<Handle>,

    /// Maximum level currently in the graph.
    max_level: usize,

    /// Per-node adjacency lists.
    /// `nodes[handle][level]` -> neighbor handles at that level.
    /// A node belongs to levels `0..nodes[handle].len()`.
    nodes: Vec<Vec<Vec<Handle>>>,
}

impl HnswGraph {
    /// Create an empty graph with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entry_point: None,
            max_level: 0,
            nodes: Vec::with_capacity(capacity),
        }
    }

    /// Number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Entry point handle, `None` for an empty graph.
    pub fn entry_point(&self) -> Option<Handle> {
        self.entry_point
    }

    /// Highest layer present in the graph.
    pub fn max_level(&self) -> usize {
        self.max_level
    }

    /// Top layer of a node.
    pub fn level(&self, handle: Handle) -> Option<usize> {
        self.nodes
            .get(handle)
            .map(|layers| layers.len().saturating_sub(1))
    }

    /// Append a node that reaches up to `level`. Returns its handle.
    pub(crate) fn add_node(&mut self, level: usize) -> Handle {
        self.nodes.push(vec![Vec::new(); level + 1]);
        self.nodes.len() - 1
    }

    /// Make `handle` the entry point at `level`.
    pub(crate) fn set_entry_point(&mut self, handle: Handle, level: usize) {
        self.entry_point = Some(handle);
        self.max_level = level;
    }

    /// Get neighbors of a node at a specific level.
    ///
    /// Returns an empty slice when the node is absent from that level.
    pub fn neighbors(&self, handle: Handle, level: usize) -> &[Handle] {
        self.nodes
            .get(handle)
            .and_then(|layers| layers.get(level))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Set neighbors for a node at a specific level (replacing existing ones).
    pub(crate) fn set_neighbors(&mut self, handle: Handle, level: usize, neighbors: Vec<Handle>) {
        if let Some(slot) = self
            .nodes
            .get_mut(handle)
            .and_then(|layers| layers.get_mut(level))
        {
            *slot = neighbors;
        }
    }

    /// Add a single link `handle -> neighbor` at `level`, returning the new degree.
    pub(crate) fn push_neighbor(&mut self, handle: Handle, level: usize, neighbor: Handle) -> usize {
        match self
            .nodes
            .get_mut(handle)
            .and_then(|layers| layers.get_mut(level))
        {
            Some(slot) => {
                if !slot.contains(&neighbor) {
                    slot.push(neighbor);
                }
                slot.len()
            }
            None => 0,
        }
    }

    /// Number of nodes present in each layer, layer 0 first.
    pub fn layer_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.max_level + 1];
        for layers in &self.nodes {
            for size in sizes.iter_mut().take(layers.len()) {
                *size += 1;
            }
        }
        sizes
    }

    /// Total number of directed edges in `level`.
    pub fn edge_count(&self, level: usize) -> usize {
        self.nodes
            .iter()
            .filter_map(|layers| layers.get(level))
            .map(Vec::len)
            .sum()
    }

    /// Verify structural invariants.
    ///
    /// Checks that links stay in range, point at nodes present in the same
    /// layer, never loop back to their source, and respect the degree bound.
    /// Layer nesting holds by construction since each node stores its layers
    /// contiguously from 0.
    pub fn validate(&self, config: &HnswConfig) -> Result<()> {
        let Some(entry) = self.entry_point else {
            if self.nodes.is_empty() {
                return Ok(());
            }
            return Err(AnnexError::internal("non-empty graph without entry point"));
        };

        if self.level(entry) != Some(self.max_level) {
            return Err(AnnexError::internal(format!(
                "entry point {entry} does not reach max level {}",
                self.max_level
            )));
        }

        for (handle, layers) in self.nodes.iter().enumerate() {
            if layers.len() > self.max_level + 1 {
                return Err(AnnexError::internal(format!(
                    "node {handle} exceeds max level {}",
                    self.max_level
                )));
            }
            for (level, neighbors) in layers.iter().enumerate() {
                if neighbors.len() > config.max_connections(level) {
                    return Err(AnnexError::internal(format!(
                        "node {handle} has {} links at level {level}",
                        neighbors.len()
                    )));
                }
                for &neighbor in neighbors {
                    if neighbor == handle {
                        return Err(AnnexError::internal(format!(
                            "node {handle} links to itself at level {level}"
                        )));
                    }
                    match self.level(neighbor) {
                        Some(top) if top >= level => {}
                        _ => {
                            return Err(AnnexError::internal(format!(
                                "node {handle} links to {neighbor} absent from level {level}"
                            )));
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_nodes_and_links() {
        let mut graph = HnswGraph::with_capacity(3);
        let a = graph.add_node(2);
        let b = graph.add_node(0);
        graph.set_entry_point(a, 2);

        assert_eq!(graph.push_neighbor(a, 0, b), 1);
        assert_eq!(graph.push_neighbor(a, 0, b), 1); // duplicate ignored
        graph.push_neighbor(b, 0, a);

        assert_eq!(graph.neighbors(a, 0), &[b]);
        assert_eq!(graph.neighbors(b, 1), &[] as &[Handle]);
        assert_eq!(graph.level(a), Some(2));
        assert_eq!(graph.layer_sizes(), vec![2, 1, 1]);
        assert_eq!(graph.edge_count(0), 2);
        assert!(graph.validate(&HnswConfig::default()).is_ok());
    }

    #[test]
    fn test_validate_rejects_link_above_node_level() {
        let mut graph = HnswGraph::with_capacity(2);
        let a = graph.add_node(1);
        let b = graph.add_node(0);
        graph.set_entry_point(a, 1);
        graph.set_neighbors(a, 1, vec![b]);

        assert!(matches!(
            graph.validate(&HnswConfig::default()),
            Err(AnnexError::Internal(_))
        ));
    }

    #[test]
    fn test_validate_rejects_degree_overflow() {
        let config = HnswConfig::default().with_m(2);
        let mut graph = HnswGraph::with_capacity(6);
        for _ in 0..6 {
            graph.add_node(0);
        }
        graph.set_entry_point(0, 0);
        graph.set_neighbors(0, 0, vec![1, 2, 3, 4, 5]);

        assert!(graph.validate(&config).is_err());
    }
}
