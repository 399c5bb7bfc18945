pub mod literature_service;
pub mod pubmed;

pub use literature_service::LiteratureService;
pub use pubmed::{normalize_article, PubMedClient, RawArticle};

use async_trait::async_trait;

use crate::errors::LiteratureResult;

/// A searchable article database
#[async_trait]
pub trait LiteratureSource: Send + Sync {
    /// Up to `max_results` articles for `query`, already normalized
    async fn search(&self, query: &str, max_results: usize) -> LiteratureResult<Vec<medisense_models::LiteratureItem>>;
}
