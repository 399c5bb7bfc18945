use medisense_models::GraphRecord;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::GraphResult;
use crate::graph_db::{build_treatment_query, GraphStore, SchemaCache};

/// Symptom → disease → medicine lookups against a [`GraphStore`]
pub struct GraphService {
    store: Arc<dyn GraphStore>,
    schema: SchemaCache,
}

impl GraphService {
    pub fn new(store: Arc<dyn GraphStore>, schema_ttl: Duration) -> Self {
        Self {
            store,
            schema: SchemaCache::new(schema_ttl),
        }
    }

    /// Diseases and medicines linked to any of `symptoms`, in store order.
    ///
    /// Symptoms are filtered against the cached schema first. When nothing
    /// survives, the store is not queried.
    pub async fn lookup_treatments(&self, symptoms: &[String]) -> GraphResult<Vec<GraphRecord>> {
        let snapshot = self.schema.get(self.store.as_ref()).await;
        let query = build_treatment_query(symptoms, snapshot.as_ref());

        if query.symptoms().is_empty() {
            tracing::debug!("No graph-answerable symptoms; skipping graph query");
            return Ok(Vec::new());
        }

        let records = self.store.find_treatments(&query).await?;
        tracing::info!(
            symptoms = ?query.symptoms(),
            rows = records.len(),
            "Graph lookup complete"
        );
        Ok(records)
    }

    pub fn invalidate_schema(&self) {
        self.schema.invalidate();
    }
}
