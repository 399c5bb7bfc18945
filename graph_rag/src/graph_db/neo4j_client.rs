use async_trait::async_trait;
use medisense_models::{GraphRecord, SchemaSnapshot};
use neo4rs::{query, ConfigBuilder, Graph};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::{CypherQuery, GraphStore};
use crate::errors::{GraphError, GraphResult};

/// Neo4j client compatible with both local Neo4j and Neo4j AuraDB
pub struct Neo4jClient {
    graph: Arc<Graph>,
    uri: String,
    timeout: Duration,
    closed: AtomicBool,
}

/// Run `call` unless the client is closed, failing after `timeout`
async fn guarded<T, F>(closed: &AtomicBool, timeout: Duration, operation: &'static str, call: F) -> GraphResult<T>
where
    F: Future<Output = GraphResult<T>>,
{
    if closed.load(Ordering::Acquire) {
        return Err(GraphError::Closed);
    }
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(GraphError::Timeout(operation)),
    }
}

impl Neo4jClient {
    /// Connect and verify the connection with a trivial query.
    ///
    /// # Arguments
    /// * `uri` - Neo4j connection URI. Supports:
    ///   - Local: `bolt://localhost:7687`
    ///   - AuraDB: `neo4j+s://xxxxx.databases.neo4j.io`
    /// * `user` - Database username
    /// * `password` - Database password
    /// * `timeout_secs` - Limit for the connection test and every later query
    pub async fn new(uri: &str, user: &str, password: &str, timeout_secs: u64) -> GraphResult<Self> {
        let timeout = Duration::from_secs(timeout_secs);
        tracing::info!("🔷 Connecting to Neo4j at: {}", uri);

        let config = ConfigBuilder::default()
            .uri(uri)
            .user(user)
            .password(password)
            .db("neo4j")
            .fetch_size(500)
            .max_connections(10)
            .build()
            .map_err(|e| GraphError::Neo4j(format!("Failed to build Neo4j config: {}", e)))?;

        let graph = Graph::connect(config)
            .await
            .map_err(|e| GraphError::Neo4j(format!("Failed to connect to Neo4j: {}", e)))?;

        let open = AtomicBool::new(false);
        guarded(&open, timeout, "connection test", async {
            let mut result = graph
                .execute(query("RETURN 1 as test"))
                .await
                .map_err(|e| GraphError::Neo4j(format!("Connection test failed: {}", e)))?;

            if result.next().await?.is_some() {
                tracing::info!("✅ Neo4j connection established successfully");
            }
            Ok::<_, GraphError>(())
        })
        .await?;

        Ok(Self {
            graph: Arc::new(graph),
            uri: uri.to_string(),
            timeout,
            closed: open,
        })
    }

    /// Run a query and deserialize every row, preserving server order
    pub async fn execute<T: DeserializeOwned>(&self, cypher: &CypherQuery) -> GraphResult<Vec<T>> {
        guarded(&self.closed, self.timeout, "query", async {
            let mut result = self.graph.execute(cypher.to_neo4j()).await?;

            let mut rows = Vec::new();
            while let Some(row) = result.next().await? {
                let record = row.to::<T>().map_err(|e| GraphError::Decode(e.to_string()))?;
                rows.push(record);
            }
            Ok::<_, GraphError>(rows)
        })
        .await
    }

    async fn single_column(&self, cypher: &'static str, column: &str) -> GraphResult<Vec<String>> {
        guarded(&self.closed, self.timeout, cypher, async {
            let mut result = self.graph.execute(query(cypher)).await?;

            let mut values = Vec::new();
            while let Some(row) = result.next().await? {
                if let Ok(value) = row.get::<String>(column) {
                    values.push(value);
                }
            }
            Ok::<_, GraphError>(values)
        })
        .await
    }

    /// Stop accepting queries.
    ///
    /// Pooled connections are released when the last handle drops.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            tracing::info!(uri = %self.uri, "Neo4j client closed");
        }
    }
}

#[async_trait]
impl GraphStore for Neo4jClient {
    async fn find_treatments(&self, query: &CypherQuery) -> GraphResult<Vec<GraphRecord>> {
        if query.symptoms().is_empty() {
            return Ok(Vec::new());
        }
        self.execute::<GraphRecord>(query).await
    }

    async fn schema(&self) -> Option<SchemaSnapshot> {
        let labels = self
            .single_column("CALL db.labels() YIELD label RETURN label", "label")
            .await;
        let relationships = self
            .single_column(
                "CALL db.relationshipTypes() YIELD relationshipType RETURN relationshipType",
                "relationshipType",
            )
            .await;

        match (labels, relationships) {
            (Ok(labels), Ok(relationships)) => Some(SchemaSnapshot::new(labels, relationships)),
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(error = %e, "Failed to read graph schema");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHORT: Duration = Duration::from_millis(20);

    #[tokio::test]
    async fn test_guarded_passes_result_through() {
        let open = AtomicBool::new(false);
        let rows = guarded(&open, SHORT, "query", async { Ok(vec![1, 2]) }).await.unwrap();
        assert_eq!(rows, vec![1, 2]);

        let err = guarded::<(), _>(&open, SHORT, "query", async { Err(GraphError::Decode("bad".into())) })
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::Decode(_)));
    }

    #[tokio::test]
    async fn test_guarded_times_out_stalled_query() {
        let open = AtomicBool::new(false);
        let err = guarded::<(), _>(&open, SHORT, "query", std::future::pending())
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::Timeout("query")));
    }

    #[tokio::test]
    async fn test_guarded_rejects_after_close() {
        let closed = AtomicBool::new(true);
        let err = guarded(&closed, SHORT, "query", async { Ok(()) }).await.unwrap_err();
        assert!(matches!(err, GraphError::Closed));
    }
}
