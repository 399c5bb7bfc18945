//! PubMed retrieval and the fetch-and-index step that grows the vector store.

pub mod errors;
pub mod services;

pub use errors::{LiteratureError, LiteratureResult};
pub use services::{normalize_article, LiteratureService, LiteratureSource, PubMedClient, RawArticle};
