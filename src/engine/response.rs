//! Search response types.

use serde::{Deserialize, Serialize};

/// Message attached to every successful response.
pub const SUCCESS_MESSAGE: &str = "Search completed successfully.";

/// One neighbor of a query, identified by its external id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub id: String,
    pub distance: f32,
}

/// Ranked neighbors of a single query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub query_id: String,
    pub neighbors: Vec<Neighbor>,
}

/// Results for a whole request, one entry per query in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnResponse {
    pub message: String,
    pub results: Vec<QueryResult>,
}

impl AnnResponse {
    pub fn success(results: Vec<QueryResult>) -> Self {
        Self {
            message: SUCCESS_MESSAGE.to_string(),
            results,
        }
    }
}
