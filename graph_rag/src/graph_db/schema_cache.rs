use medisense_models::SchemaSnapshot;
use parking_lot::RwLock;
use std::time::{Duration, Instant};

use super::GraphStore;

struct CachedSchema {
    snapshot: SchemaSnapshot,
    fetched_at: Instant,
}

/// Schema snapshot shared across requests, refreshed after `ttl`.
///
/// Failed reads are not cached; the next lookup tries again.
pub struct SchemaCache {
    ttl: Duration,
    entry: RwLock<Option<CachedSchema>>,
}

impl SchemaCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entry: RwLock::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached snapshot if still fresh, without touching the store
    pub fn peek(&self) -> Option<SchemaSnapshot> {
        self.entry
            .read()
            .as_ref()
            .filter(|cached| cached.fetched_at.elapsed() < self.ttl)
            .map(|cached| cached.snapshot.clone())
    }

    pub async fn get(&self, store: &dyn GraphStore) -> Option<SchemaSnapshot> {
        if let Some(snapshot) = self.peek() {
            return Some(snapshot);
        }

        let snapshot = store.schema().await?;
        tracing::debug!(
            labels = snapshot.nodes.len(),
            relationships = snapshot.relationships.len(),
            "Refreshed graph schema"
        );
        self.put(snapshot.clone());
        Some(snapshot)
    }

    pub fn put(&self, snapshot: SchemaSnapshot) {
        *self.entry.write() = Some(CachedSchema {
            snapshot,
            fetched_at: Instant::now(),
        });
    }

    pub fn invalidate(&self) {
        *self.entry.write() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::GraphResult;
    use crate::graph_db::CypherQuery;
    use async_trait::async_trait;
    use medisense_models::GraphRecord;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingStore {
        schema: Option<SchemaSnapshot>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl GraphStore for CountingStore {
        async fn find_treatments(&self, _query: &CypherQuery) -> GraphResult<Vec<GraphRecord>> {
            Ok(Vec::new())
        }

        async fn schema(&self) -> Option<SchemaSnapshot> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.schema.clone()
        }
    }

    fn store(schema: Option<SchemaSnapshot>) -> CountingStore {
        CountingStore {
            schema,
            calls: AtomicUsize::new(0),
        }
    }

    #[tokio::test]
    async fn test_fresh_entry_served_from_cache() {
        let store = store(Some(SchemaSnapshot::new(["Symptom"], ["HAS_SYMPTOM"])));
        let cache = SchemaCache::new(Duration::from_secs(60));

        assert!(cache.get(&store).await.unwrap().has_label("Symptom"));
        assert!(cache.get(&store).await.is_some());
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_ttl_always_refetches() {
        let store = store(Some(SchemaSnapshot::default()));
        let cache = SchemaCache::new(Duration::ZERO);

        cache.get(&store).await;
        cache.get(&store).await;
        assert_eq!(store.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refresh() {
        let store = store(Some(SchemaSnapshot::default()));
        let cache = SchemaCache::new(Duration::from_secs(60));

        cache.get(&store).await;
        cache.invalidate();
        assert!(cache.peek().is_none());
        cache.get(&store).await;
        assert_eq!(store.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unavailable_schema_not_cached() {
        let store = store(None);
        let cache = SchemaCache::new(Duration::from_secs(60));

        assert!(cache.get(&store).await.is_none());
        assert!(cache.get(&store).await.is_none());
        assert_eq!(store.calls.load(Ordering::SeqCst), 2);
    }
}
