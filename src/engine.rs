//! Request-level orchestration: validate, build, fan out queries, map ids.
//!
//! The engine rebuilds an index for every request and discards it
//! afterwards. Callers that want to keep an index across requests can use
//! [`AnnEngine::build_index`] and query the returned
//! [`HnswIndex`](crate::vector::index::hnsw::HnswIndex) directly.
//!
//! ```
//! use annex::engine::{AnnEngine, AnnRequest, EngineConfig, VectorData};
//!
//! let engine = AnnEngine::new(EngineConfig::default()).unwrap();
//! let request = AnnRequest::new(
//!     vec![
//!         VectorData::new("a", vec![0.0, 0.0]),
//!         VectorData::new("b", vec![3.0, 4.0]),
//!     ],
//!     vec![VectorData::new("q", vec![0.0, 0.0])],
//!     2,
//! );
//!
//! let response = engine.execute(&request).unwrap();
//! assert_eq!(response.results[0].neighbors[0].id, "a");
//! assert_eq!(response.results[0].neighbors[1].distance, 25.0);
//! ```

pub mod config;
pub mod request;
pub mod response;

use std::sync::Arc;
use std::time::Instant;

use rayon::ThreadPool;
use tracing::{debug, info};

use crate::error::{AnnexError, Result};
use crate::util::cancel::CancellationToken;
use crate::vector::index::hnsw::HnswIndex;
use crate::vector::index::hnsw::builder::HnswIndexBuilder;
use crate::vector::search::SearchResult;

pub use self::config::EngineConfig;
pub use self::request::{AnnRequest, VectorData};
pub use self::response::{AnnResponse, Neighbor, QueryResult};

/// Builds an index per request and answers the request's queries.
#[derive(Debug, Clone)]
pub struct AnnEngine {
    config: EngineConfig,
    thread_pool: Option<Arc<ThreadPool>>,
}

impl AnnEngine {
    /// Create a new engine, spawning a dedicated pool if `num_threads` is set.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;

        let thread_pool = match config.num_threads {
            Some(num_threads) => Some(Arc::new(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(num_threads)
                    .build()
                    .map_err(|e| AnnexError::internal(format!("Failed to create thread pool: {e}")))?,
            )),
            None => None,
        };

        Ok(Self {
            config,
            thread_pool,
        })
    }

    /// Get the configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// A token carrying the configured deadline, if any.
    pub fn request_token(&self) -> CancellationToken {
        match self.config.timeout() {
            Some(timeout) => CancellationToken::with_timeout(timeout),
            None => CancellationToken::new(),
        }
    }

    /// Validate `request` and build an index over its dataset.
    ///
    /// Dimensions of every dataset and query vector are checked before any
    /// graph work starts.
    pub fn build_index(&self, request: &AnnRequest, token: &CancellationToken) -> Result<HnswIndex> {
        let dimension = request.validate_dimensions()?;
        debug!(
            points = request.dataset.len(),
            queries = request.query.len(),
            dimension,
            "building index for request"
        );

        HnswIndexBuilder::new(self.config.hnsw.clone())?
            .with_cancellation(token.clone())
            .build(request.points())
    }

    /// Run `request`, aborting on the first failure.
    pub fn execute(&self, request: &AnnRequest) -> Result<AnnResponse> {
        self.execute_with_token(request, &self.request_token())
    }

    /// Run `request` under `token`, aborting on the first failure.
    pub fn execute_with_token(
        &self,
        request: &AnnRequest,
        token: &CancellationToken,
    ) -> Result<AnnResponse> {
        let results = self
            .execute_detailed_with_token(request, token)?
            .into_iter()
            .collect::<Result<Vec<_>>>()?;
        Ok(AnnResponse::success(results))
    }

    /// Run `request`, reporting each query's outcome separately.
    ///
    /// Request-level failures (bad dimensions, empty dataset, `k == 0`, a
    /// failed build) still fail the whole call.
    pub fn execute_detailed(&self, request: &AnnRequest) -> Result<Vec<Result<QueryResult>>> {
        self.execute_detailed_with_token(request, &self.request_token())
    }

    fn execute_detailed_with_token(
        &self,
        request: &AnnRequest,
        token: &CancellationToken,
    ) -> Result<Vec<Result<QueryResult>>> {
        if request.k == 0 {
            return Err(AnnexError::invalid_argument("k must be > 0"));
        }

        let start = Instant::now();
        let index = self.build_index(request, token)?;
        let build_ms = start.elapsed().as_millis() as u64;

        let results = self.run_queries(&index, request, token);

        info!(
            points = index.len(),
            queries = request.query.len(),
            k = request.k,
            build_ms,
            total_ms = start.elapsed().as_millis() as u64,
            "request completed"
        );
        Ok(results)
    }

    /// Answer every query of `request` against `index`, in input order.
    pub fn run_queries(
        &self,
        index: &HnswIndex,
        request: &AnnRequest,
        token: &CancellationToken,
    ) -> Vec<Result<QueryResult>> {
        let mut searcher = index.searcher().with_cancellation(token.clone());
        searcher.set_ef_search(self.config.hnsw.ef_search);

        let queries: Vec<&[f32]> = request.query.iter().map(|q| q.vector.as_slice()).collect();
        let raw = if self.config.parallel_queries {
            match &self.thread_pool {
                Some(pool) => pool.install(|| searcher.batch_search(&queries, request.k)),
                None => searcher.batch_search(&queries, request.k),
            }
        } else {
            queries
                .iter()
                .map(|query| searcher.search(query, request.k))
                .collect()
        };

        raw.into_iter()
            .zip(&request.query)
            .map(|(result, query)| result.map(|found| map_ids(index, &query.id, found)))
            .collect()
    }
}

/// Replace internal handles with the dataset's external ids.
fn map_ids(index: &HnswIndex, query_id: &str, result: SearchResult) -> QueryResult {
    let neighbors = result
        .neighbors
        .into_iter()
        .filter_map(|scored| {
            index.point(scored.handle).map(|point| Neighbor {
                id: point.id.clone(),
                distance: scored.distance,
            })
        })
        .collect();

    QueryResult {
        query_id: query_id.to_string(),
        neighbors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(k: usize) -> AnnRequest {
        AnnRequest::new(
            (0..20)
                .map(|i| VectorData::new(format!("d{i}"), vec![i as f32, 0.0]))
                .collect(),
            vec![
                VectorData::new("near-3", vec![3.1, 0.0]),
                VectorData::new("near-17", vec![16.8, 0.0]),
            ],
            k,
        )
    }

    #[test]
    fn test_execute_maps_ids() {
        let engine = AnnEngine::new(EngineConfig::default()).unwrap();
        let response = engine.execute(&request(3)).unwrap();

        assert_eq!(response.message, response::SUCCESS_MESSAGE);
        assert_eq!(response.results.len(), 2);
        assert_eq!(response.results[0].query_id, "near-3");
        assert_eq!(response.results[0].neighbors[0].id, "d3");
        assert_eq!(response.results[1].neighbors[0].id, "d17");
        assert!(response.results.iter().all(|r| r.neighbors.len() == 3));
    }

    #[test]
    fn test_zero_k_rejected() {
        let engine = AnnEngine::new(EngineConfig::default()).unwrap();
        assert!(matches!(
            engine.execute(&request(0)),
            Err(AnnexError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_dedicated_pool_and_sequential_agree() {
        let pooled = AnnEngine::new(EngineConfig::default().with_num_threads(2)).unwrap();
        let sequential = AnnEngine::new(EngineConfig {
            parallel_queries: false,
            ..EngineConfig::default()
        })
        .unwrap();

        assert_eq!(
            pooled.execute(&request(4)).unwrap(),
            sequential.execute(&request(4)).unwrap()
        );
    }

    #[test]
    fn test_cancelled_request() {
        let engine = AnnEngine::new(EngineConfig::default()).unwrap();
        let token = CancellationToken::new();
        token.cancel();

        assert!(matches!(
            engine.execute_with_token(&request(2), &token),
            Err(AnnexError::OperationCancelled(_))
        ));
    }

    #[test]
    fn test_invalid_thread_count() {
        assert!(AnnEngine::new(EngineConfig {
            num_threads: Some(0),
            ..EngineConfig::default()
        })
        .is_err());
    }
}
