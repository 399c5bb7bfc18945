use thiserror::Error;
use vector_rag::{EmbeddingError, VectorStoreError};

#[derive(Error, Debug)]
pub enum LiteratureError {
    #[error("PubMed request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("PubMed API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Failed to parse PubMed response: {0}")]
    Parse(String),

    #[error("Failed to embed abstracts: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Failed to index articles: {0}")]
    Index(#[from] VectorStoreError),
}

impl LiteratureError {
    /// Remote fetch failures; these degrade to "no articles"
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            LiteratureError::Http(_) | LiteratureError::Api { .. } | LiteratureError::Parse(_)
        )
    }
}

pub type LiteratureResult<T> = Result<T, LiteratureError>;
