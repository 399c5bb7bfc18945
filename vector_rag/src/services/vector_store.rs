use medisense_models::VectorHit;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::OnceCell;

use super::{VectorBackend, VectorPoint};
use crate::errors::{VectorResult, VectorStoreError};

/// The single article collection, with dimension checks in front of the backend.
///
/// The collection is created on first use. Check-then-create runs at most
/// once per process at a time; a failed attempt is retried on the next call.
pub struct VectorStoreService {
    backend: Arc<dyn VectorBackend>,
    collection: String,
    dimension: usize,
    ready: Mutex<Arc<OnceCell<()>>>,
}

impl VectorStoreService {
    pub fn new(backend: Arc<dyn VectorBackend>, collection: impl Into<String>, dimension: usize) -> Self {
        Self {
            backend,
            collection: collection.into(),
            dimension,
            ready: Mutex::new(Arc::new(OnceCell::new())),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn check_dimension(&self, vector: &[f32]) -> VectorResult<()> {
        if vector.len() != self.dimension {
            return Err(VectorStoreError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        Ok(())
    }

    async fn ensure_collection(&self) -> VectorResult<()> {
        let cell = self.ready.lock().clone();
        cell.get_or_try_init(|| async {
            if self.backend.collection_exists(&self.collection).await? {
                tracing::debug!("Collection {} already exists", self.collection);
                return Ok(());
            }
            match self.backend.create_collection(&self.collection, self.dimension).await {
                Ok(()) => Ok(()),
                Err(e) if e.is_already_exists() => {
                    tracing::info!("Collection {} created concurrently elsewhere", self.collection);
                    Ok(())
                }
                Err(e) => Err(e),
            }
        })
        .await
        .map(|_| ())
    }

    /// Insert or replace points.
    ///
    /// `ids`, `vectors` and `payloads` must line up, and every vector must have
    /// the collection's dimension. Backend failures are returned.
    pub async fn upsert(
        &self,
        ids: &[u64],
        vectors: Vec<Vec<f32>>,
        payloads: Vec<Map<String, Value>>,
    ) -> VectorResult<()> {
        if ids.len() != vectors.len() || ids.len() != payloads.len() {
            return Err(VectorStoreError::LengthMismatch {
                ids: ids.len(),
                vectors: vectors.len(),
                payloads: payloads.len(),
            });
        }
        for vector in &vectors {
            self.check_dimension(vector)?;
        }
        if ids.is_empty() {
            return Ok(());
        }

        self.ensure_collection().await?;

        let points: Vec<VectorPoint> = ids
            .iter()
            .zip(vectors)
            .zip(payloads)
            .map(|((id, vector), payload)| VectorPoint {
                id: *id,
                vector,
                payload,
            })
            .collect();
        let count = points.len();

        self.backend.upsert(&self.collection, points).await.map_err(|e| {
            tracing::error!(collection = %self.collection, error = %e, "Vector upsert failed");
            e
        })?;

        tracing::info!(collection = %self.collection, count, "Upserted vectors");
        Ok(())
    }

    /// Up to `top_k` nearest articles.
    ///
    /// A wrong-length query vector is an error; backend trouble yields no hits.
    pub async fn search(&self, vector: &[f32], top_k: usize) -> VectorResult<Vec<VectorHit>> {
        self.check_dimension(vector)?;

        if let Err(e) = self.ensure_collection().await {
            tracing::warn!(collection = %self.collection, error = %e, "Collection unavailable; returning no hits");
            return Ok(Vec::new());
        }

        match self.backend.search(&self.collection, vector, top_k).await {
            Ok(hits) => Ok(hits),
            Err(e) => {
                tracing::warn!(collection = %self.collection, error = %e, "Vector search failed; returning no hits");
                Ok(Vec::new())
            }
        }
    }

    /// True when the collection holds no points or cannot be counted
    pub async fn is_empty(&self) -> bool {
        if let Err(e) = self.ensure_collection().await {
            tracing::warn!(collection = %self.collection, error = %e, "Cannot check collection; treating as empty");
            return true;
        }
        match self.backend.count(&self.collection).await {
            Ok(count) => count == 0,
            Err(e) => {
                tracing::warn!(collection = %self.collection, error = %e, "Cannot count points; treating as empty");
                true
            }
        }
    }

    pub async fn delete_collection(&self) -> VectorResult<()> {
        match self.backend.delete_collection(&self.collection).await {
            Ok(()) => {
                *self.ready.lock() = Arc::new(OnceCell::new());
                tracing::info!(collection = %self.collection, "Collection deleted");
                Ok(())
            }
            Err(e) => {
                tracing::error!(collection = %self.collection, error = %e, "Failed to delete collection");
                Err(e)
            }
        }
    }

    pub fn close(&self) {
        self.backend.close();
    }
}
