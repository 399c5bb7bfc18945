pub mod neo4j_client;
pub mod query_builder;
pub mod schema_cache;

pub use neo4j_client::Neo4jClient;
pub use query_builder::{build_treatment_query, validate_symptoms, CypherParam, CypherQuery};
pub use schema_cache::SchemaCache;

use async_trait::async_trait;
use medisense_models::{GraphRecord, SchemaSnapshot};

use crate::errors::GraphResult;

/// The two graph operations the chat pipeline needs.
///
/// Implemented by [`Neo4jClient`]; tests substitute in-memory graphs.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Run a treatment traversal and decode its `disease`/`medicine` rows in order
    async fn find_treatments(&self, query: &CypherQuery) -> GraphResult<Vec<GraphRecord>>;

    /// Node labels and relationship types, or `None` when they cannot be read
    async fn schema(&self) -> Option<SchemaSnapshot>;
}
