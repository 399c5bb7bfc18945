//! Embeddings and nearest-neighbour search over PubMed abstracts.

pub mod errors;
pub mod models;
pub mod services;

pub use errors::{EmbeddingError, EmbeddingResult, VectorResult, VectorStoreError};
pub use models::{Embedder, HuggingFaceEmbedder};
pub use services::{InMemoryVectorBackend, QdrantBackend, VectorBackend, VectorPoint, VectorStoreService};
