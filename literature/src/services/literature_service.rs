use medisense_models::LiteratureItem;
use std::sync::Arc;
use vector_rag::{Embedder, VectorStoreService};

use super::LiteratureSource;
use crate::errors::LiteratureResult;

pub const DEFAULT_MAX_RESULTS: usize = 10;

/// Fetches fresh articles and indexes their abstracts.
///
/// This is the only path that adds points to the vector store.
pub struct LiteratureService {
    source: Arc<dyn LiteratureSource>,
    embedder: Arc<dyn Embedder>,
    store: Arc<VectorStoreService>,
}

impl LiteratureService {
    pub fn new(
        source: Arc<dyn LiteratureSource>,
        embedder: Arc<dyn Embedder>,
        store: Arc<VectorStoreService>,
    ) -> Self {
        Self {
            source,
            embedder,
            store,
        }
    }

    /// Search, then embed and upsert every returned abstract keyed by PMID.
    ///
    /// A blank query, no matches, or a failed remote search all give an empty
    /// list. Embedding and index write failures are returned.
    pub async fn fetch_and_store(&self, query: &str, max_results: usize) -> LiteratureResult<Vec<LiteratureItem>> {
        if query.trim().is_empty() {
            tracing::warn!("Empty query provided. Skipping PubMed fetch.");
            return Ok(Vec::new());
        }

        let items = match self.source.search(query, max_results).await {
            Ok(items) => items,
            Err(e) => {
                tracing::error!(error = %e, "Error fetching data from PubMed");
                return Ok(Vec::new());
            }
        };
        if items.is_empty() {
            tracing::warn!("No articles found in PubMed.");
            return Ok(Vec::new());
        }

        let abstracts: Vec<String> = items.iter().map(|i| i.abstract_text.clone()).collect();
        let vectors = self.embedder.embed_batch(&abstracts).await?;

        let ids: Vec<u64> = items.iter().map(|i| i.id).collect();
        let payloads = items.iter().map(LiteratureItem::index_payload).collect();
        self.store.upsert(&ids, vectors, payloads).await?;

        tracing::info!("Inserted {} PubMed articles into the vector index.", ids.len());
        Ok(items)
    }
}
