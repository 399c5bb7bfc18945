use async_trait::async_trait;
use medisense_models::VectorHit;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};

use super::{VectorBackend, VectorPoint};
use crate::errors::{VectorResult, VectorStoreError};

struct Collection {
    dimension: usize,
    points: BTreeMap<u64, VectorPoint>,
}

/// Brute-force cosine search held in process memory.
///
/// Used by tests and by local runs without a Qdrant server.
#[derive(Default)]
pub struct InMemoryVectorBackend {
    collections: RwLock<HashMap<String, Collection>>,
    closed: AtomicBool,
}

impl InMemoryVectorBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_open(&self) -> VectorResult<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(VectorStoreError::Closed);
        }
        Ok(())
    }
}

fn missing(collection: &str) -> VectorStoreError {
    VectorStoreError::Backend(format!("Collection `{}` not found", collection))
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorBackend for InMemoryVectorBackend {
    async fn collection_exists(&self, collection: &str) -> VectorResult<bool> {
        self.ensure_open()?;
        Ok(self.collections.read().contains_key(collection))
    }

    async fn create_collection(&self, collection: &str, dimension: usize) -> VectorResult<()> {
        self.ensure_open()?;
        let mut collections = self.collections.write();
        if collections.contains_key(collection) {
            return Err(VectorStoreError::Backend(format!(
                "Collection `{}` already exists",
                collection
            )));
        }
        collections.insert(
            collection.to_string(),
            Collection {
                dimension,
                points: BTreeMap::new(),
            },
        );
        Ok(())
    }

    async fn upsert(&self, collection: &str, points: Vec<VectorPoint>) -> VectorResult<()> {
        self.ensure_open()?;
        let mut collections = self.collections.write();
        let target = collections.get_mut(collection).ok_or_else(|| missing(collection))?;

        if let Some(bad) = points.iter().find(|p| p.vector.len() != target.dimension) {
            return Err(VectorStoreError::Backend(format!(
                "Wrong vector dimension: expected {}, got {}",
                target.dimension,
                bad.vector.len()
            )));
        }
        for point in points {
            target.points.insert(point.id, point);
        }
        Ok(())
    }

    async fn search(&self, collection: &str, vector: &[f32], limit: usize) -> VectorResult<Vec<VectorHit>> {
        self.ensure_open()?;
        let collections = self.collections.read();
        let target = collections.get(collection).ok_or_else(|| missing(collection))?;

        let mut scored: Vec<(f32, &VectorPoint)> = target
            .points
            .values()
            .map(|p| (cosine_similarity(vector, &p.vector), p))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        Ok(scored
            .into_iter()
            .take(limit)
            .map(|(score, p)| VectorHit::from_payload(p.id, score, &p.payload))
            .collect())
    }

    async fn count(&self, collection: &str) -> VectorResult<u64> {
        self.ensure_open()?;
        let collections = self.collections.read();
        let target = collections.get(collection).ok_or_else(|| missing(collection))?;
        Ok(target.points.len() as u64)
    }

    async fn delete_collection(&self, collection: &str) -> VectorResult<()> {
        self.ensure_open()?;
        self.collections
            .write()
            .remove(collection)
            .map(|_| ())
            .ok_or_else(|| missing(collection))
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn point(id: u64, vector: Vec<f32>, title: &str) -> VectorPoint {
        let mut payload = Map::new();
        payload.insert("title".to_string(), json!(title));
        payload.insert("abstract".to_string(), json!("n/a"));
        VectorPoint { id, vector, payload }
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[tokio::test]
    async fn test_search_orders_by_similarity() {
        let backend = InMemoryVectorBackend::new();
        backend.create_collection("c", 2).await.unwrap();
        backend
            .upsert(
                "c",
                vec![
                    point(1, vec![0.0, 1.0], "far"),
                    point(2, vec![1.0, 0.1], "near"),
                    point(3, vec![1.0, 1.0], "middle"),
                ],
            )
            .await
            .unwrap();

        let hits = backend.search("c", &[1.0, 0.0], 2).await.unwrap();
        let titles: Vec<&str> = hits.iter().map(|h| h.title.as_str()).collect();
        assert_eq!(titles, vec!["near", "middle"]);
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_id() {
        let backend = InMemoryVectorBackend::new();
        backend.create_collection("c", 2).await.unwrap();
        backend.upsert("c", vec![point(7, vec![1.0, 0.0], "old")]).await.unwrap();
        backend.upsert("c", vec![point(7, vec![1.0, 0.0], "new")]).await.unwrap();

        assert_eq!(backend.count("c").await.unwrap(), 1);
        let hits = backend.search("c", &[1.0, 0.0], 5).await.unwrap();
        assert_eq!(hits[0].title, "new");
    }

    #[tokio::test]
    async fn test_duplicate_create_reports_already_exists() {
        let backend = InMemoryVectorBackend::new();
        backend.create_collection("c", 2).await.unwrap();
        let err = backend.create_collection("c", 2).await.unwrap_err();
        assert!(err.is_already_exists());
    }

    #[tokio::test]
    async fn test_closed_backend_rejects_calls() {
        let backend = InMemoryVectorBackend::new();
        backend.close();
        assert!(matches!(
            backend.collection_exists("c").await,
            Err(VectorStoreError::Closed)
        ));
    }
}
