pub mod huggingface;

pub use huggingface::*;

use async_trait::async_trait;

use crate::errors::EmbeddingResult;

/// Turns text into fixed-length vectors
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> EmbeddingResult<Vec<f32>>;

    /// One vector per input, in input order
    async fn embed_batch(&self, texts: &[String]) -> EmbeddingResult<Vec<Vec<f32>>>;

    /// Length of every vector this embedder produces
    fn dimension(&self) -> usize;
}
