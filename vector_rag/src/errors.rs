use thiserror::Error;

#[derive(Error, Debug)]
pub enum VectorStoreError {
    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Batch length mismatch: {ids} ids, {vectors} vectors, {payloads} payloads")]
    LengthMismatch {
        ids: usize,
        vectors: usize,
        payloads: usize,
    },

    #[error("Vector backend error: {0}")]
    Backend(String),

    #[error("Vector backend timed out during {0}")]
    Timeout(&'static str),

    #[error("Vector backend is closed")]
    Closed,
}

impl VectorStoreError {
    /// Validation failures are caller mistakes; everything else is the backend
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            VectorStoreError::DimensionMismatch { .. } | VectorStoreError::LengthMismatch { .. }
        )
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, VectorStoreError::Backend(msg) if msg.to_lowercase().contains("already exists"))
    }
}

pub type VectorResult<T> = Result<T, VectorStoreError>;

#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("Cannot embed empty text")]
    EmptyInput,

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Expected {expected} embeddings, got {actual}")]
    CountMismatch { expected: usize, actual: usize },

    #[error("Embedding request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Embedding API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Failed to parse embedding response: {0}")]
    Parse(String),
}

pub type EmbeddingResult<T> = Result<T, EmbeddingError>;
