//! Wires concrete clients into a [`ChatOrchestrator`] from [`AppConfig`].

use anyhow::Context;
use graph_rag::{GraphService, Neo4jClient};
use literature::{LiteratureService, PubMedClient};
use medisense_config::{AppConfig, ExtractorKind, VectorBackendKind};
use medisense_llm::{GeminiClient, LlmGenerationClient};
use std::sync::Arc;
use std::time::Duration;
use vector_rag::{
    Embedder, HuggingFaceEmbedder, InMemoryVectorBackend, QdrantBackend, VectorBackend, VectorStoreService,
};

use crate::services::{
    ChatOrchestrator, KeywordExtractor, LlmExtractor, PipelineComponents, ResponseComposer, SymptomExtractor,
};

/// Long-lived handles owned by the process
pub struct Runtime {
    pub orchestrator: Arc<ChatOrchestrator>,
    pub neo4j: Arc<Neo4jClient>,
    pub vector_store: Arc<VectorStoreService>,
}

impl Runtime {
    /// Release the graph connection and the vector index client.
    pub fn shutdown(&self) {
        self.neo4j.close();
        self.vector_store.close();
        tracing::info!("Connections closed");
    }
}

fn vector_backend(config: &AppConfig) -> anyhow::Result<Arc<dyn VectorBackend>> {
    let backend: Arc<dyn VectorBackend> = match config.vector.backend {
        VectorBackendKind::Qdrant => Arc::new(
            QdrantBackend::new(
                &config.vector.url,
                config.vector.api_key.clone(),
                config.http_timeout_secs,
            )
            .context("Failed to create Qdrant client")?,
        ),
        VectorBackendKind::Memory => {
            tracing::warn!("Using in-memory vector index; indexed articles are lost on exit");
            Arc::new(InMemoryVectorBackend::new())
        }
    };
    Ok(backend)
}

pub async fn build(config: &AppConfig) -> anyhow::Result<Runtime> {
    let neo4j = Arc::new(
        Neo4jClient::new(
            &config.neo4j.uri,
            &config.neo4j.user,
            &config.neo4j.password,
            config.http_timeout_secs,
        )
        .await
        .context("Failed to connect to Neo4j")?,
    );
    let graph = Arc::new(GraphService::new(
        neo4j.clone(),
        Duration::from_secs(config.neo4j.schema_ttl_secs),
    ));

    let vector_store = Arc::new(VectorStoreService::new(
        vector_backend(config)?,
        config.vector.collection.clone(),
        config.vector.dimension,
    ));

    let embedder: Arc<dyn Embedder> = Arc::new(
        HuggingFaceEmbedder::new(
            &config.embedding.api_base,
            config.embedding.api_token.clone(),
            config.embedding.model.clone(),
            config.vector.dimension,
            config.http_timeout_secs,
        )
        .context("Failed to create embedding client")?,
    );

    let pubmed = Arc::new(
        PubMedClient::new(
            &config.entrez.api_base,
            config.entrez.api_key.clone(),
            config.entrez.email.clone(),
            config.entrez.tool.clone(),
            config.http_timeout_secs,
        )
        .context("Failed to create PubMed client")?,
    );
    let literature = Arc::new(LiteratureService::new(pubmed, embedder.clone(), vector_store.clone()));

    let llm: Arc<dyn LlmGenerationClient> = Arc::new(
        GeminiClient::new(
            &config.llm.api_base,
            config.llm.api_key.clone(),
            config.llm.model.clone(),
            config.http_timeout_secs,
        )
        .context("Failed to create LLM client")?,
    );

    let extractor: Arc<dyn SymptomExtractor> = match config.extractor {
        ExtractorKind::Keyword => Arc::new(
            KeywordExtractor::new(&config.vocabulary).context("Invalid symptom vocabulary")?,
        ),
        ExtractorKind::Llm => Arc::new(LlmExtractor::new(llm.clone())),
    };

    let orchestrator = Arc::new(ChatOrchestrator::new(PipelineComponents {
        extractor,
        graph,
        embedder,
        vector_store: vector_store.clone(),
        literature,
        composer: ResponseComposer::new(llm),
        top_k: config.vector.top_k,
        max_results: config.entrez.max_results,
    }));

    tracing::info!(
        neo4j = %config.neo4j.uri,
        collection = %config.vector.collection,
        embedding_model = %config.embedding.model,
        llm_model = %config.llm.model,
        extractor = ?config.extractor,
        "Pipeline initialized"
    );

    Ok(Runtime {
        orchestrator,
        neo4j,
        vector_store,
    })
}
