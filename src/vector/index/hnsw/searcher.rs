//! HNSW vector searcher for approximate search.

use rayon::prelude::*;
use tracing::debug;

use crate::error::{AnnexError, Result};
use crate::util::cancel::CancellationToken;
use crate::vector::index::hnsw::HnswIndex;
use crate::vector::index::hnsw::search::LayerSearch;
use crate::vector::search::{ScoredPoint, SearchResult};

/// HNSW searcher that performs approximate nearest neighbor search.
///
/// Borrowing the index keeps every query a read-only traversal; each call
/// allocates its own explore and result sets.
#[derive(Debug, Clone)]
pub struct HnswSearcher<'a> {
    index: &'a HnswIndex,
    ef_search: usize,
    token: Option<CancellationToken>,
}

impl<'a> HnswSearcher<'a> {
    /// Create a new HNSW searcher with the index's configured beam width.
    pub fn new(index: &'a HnswIndex) -> Self {
        Self {
            index,
            ef_search: index.config().ef_search,
            token: None,
        }
    }

    /// Set the search parameter ef.
    pub fn set_ef_search(&mut self, ef_search: usize) {
        self.ef_search = ef_search;
    }

    /// Get the search parameter ef.
    pub fn ef_search(&self) -> usize {
        self.ef_search
    }

    /// Abort searches when `token` trips.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Find the `k` nearest points to `query`.
    ///
    /// Fails with `DimensionMismatch` if `query` does not match the index and
    /// with `InvalidArgument` if it holds NaN or infinity.
    /// Returns `min(k, len)` neighbors in ascending distance order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<SearchResult> {
        if query.len() != self.index.dimension() {
            return Err(AnnexError::dimension_mismatch(
                self.index.dimension(),
                query.len(),
            ));
        }
        if !query.iter().all(|x| x.is_finite()) {
            return Err(AnnexError::invalid_argument(
                "query has a non-finite component",
            ));
        }
        if let Some(token) = &self.token {
            token.check()?;
        }

        let Some(entry_point) = self.index.entry_point() else {
            return Ok(SearchResult::new());
        };
        if k == 0 {
            return Ok(SearchResult::new());
        }

        let search = LayerSearch::new(
            self.index.graph(),
            self.index.points(),
            self.index.config().distance_metric,
        )
        .with_cancellation(self.token.as_ref());

        // Search from top layer down to layer 1
        let max_level = self.index.max_level();
        let entry = if max_level > 0 {
            search.greedy_descend(query, entry_point, max_level, 1)?.handle
        } else {
            entry_point
        };

        // Search layer 0 with larger candidate set
        let ef = self.ef_search.max(k);
        let candidates = search.search_layer(query, &[entry], ef, 0)?;
        let candidates_examined = candidates.len();

        let neighbors = candidates
            .into_iter()
            .take(k)
            .map(|candidate| ScoredPoint {
                handle: candidate.handle,
                distance: candidate.distance,
            })
            .collect();

        Ok(SearchResult {
            neighbors,
            candidates_examined,
        })
    }

    /// Run every query independently in parallel.
    ///
    /// Results line up with `queries`; a failing query yields an `Err` in its
    /// own slot without affecting the others.
    pub fn batch_search<Q>(&self, queries: &[Q], k: usize) -> Vec<Result<SearchResult>>
    where
        Q: AsRef<[f32]> + Sync,
    {
        debug!(queries = queries.len(), k, ef = self.ef_search, "HNSW batch search");
        queries
            .par_iter()
            .map(|query| self.search(query.as_ref(), k))
            .collect()
    }
}
