pub mod memory;
pub mod qdrant;
pub mod vector_store;

pub use memory::InMemoryVectorBackend;
pub use qdrant::QdrantBackend;
pub use vector_store::VectorStoreService;

use async_trait::async_trait;
use medisense_models::VectorHit;
use serde_json::{Map, Value};

use crate::errors::VectorResult;

/// One point to write: numeric id, embedding and string payload
#[derive(Debug, Clone, PartialEq)]
pub struct VectorPoint {
    pub id: u64,
    pub vector: Vec<f32>,
    pub payload: Map<String, Value>,
}

/// Raw collection operations. Validation lives in [`VectorStoreService`].
#[async_trait]
pub trait VectorBackend: Send + Sync {
    async fn collection_exists(&self, collection: &str) -> VectorResult<bool>;

    /// Create a cosine-distance collection of `dimension`-length vectors
    async fn create_collection(&self, collection: &str, dimension: usize) -> VectorResult<()>;

    /// Insert or replace points by id
    async fn upsert(&self, collection: &str, points: Vec<VectorPoint>) -> VectorResult<()>;

    /// Up to `limit` hits, most similar first
    async fn search(&self, collection: &str, vector: &[f32], limit: usize) -> VectorResult<Vec<VectorHit>>;

    async fn count(&self, collection: &str) -> VectorResult<u64>;

    async fn delete_collection(&self, collection: &str) -> VectorResult<()>;

    fn close(&self);
}
