#![allow(dead_code)]

use async_trait::async_trait;
use graph_rag::{CypherQuery, GraphError, GraphResult, GraphService, GraphStore};
use literature::{LiteratureError, LiteratureResult, LiteratureService, LiteratureSource};
use medisense::services::{KeywordExtractor, ResponseComposer};
use medisense::{ChatOrchestrator, PipelineComponents};
use medisense_config::DEFAULT_SYMPTOM_VOCABULARY;
use medisense_llm::{LlmError, LlmGenerateRequest, LlmGenerateResponse, LlmGenerationClient, OutputFormat};
use medisense_models::{GraphRecord, LiteratureItem, SchemaSnapshot};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use vector_rag::{Embedder, EmbeddingResult, InMemoryVectorBackend, VectorStoreService};

pub const DIMENSION: usize = 8;
pub const COLLECTION: &str = "pubmed_articles";

// Graph keyed by normalized symptom
#[derive(Default)]
pub struct FakeGraph {
    pub treatments: HashMap<String, Vec<GraphRecord>>,
    pub fail: bool,
}

impl FakeGraph {
    pub fn with(mut self, symptom: &str, disease: &str, medicine: &str) -> Self {
        self.treatments
            .entry(symptom.to_string())
            .or_default()
            .push(GraphRecord::new(disease, medicine));
        self
    }
}

#[async_trait]
impl GraphStore for FakeGraph {
    async fn find_treatments(&self, query: &CypherQuery) -> GraphResult<Vec<GraphRecord>> {
        if self.fail {
            return Err(GraphError::Neo4j("connection refused".to_string()));
        }
        Ok(query
            .symptoms()
            .iter()
            .filter_map(|s| self.treatments.get(s))
            .flatten()
            .cloned()
            .collect())
    }

    async fn schema(&self) -> Option<SchemaSnapshot> {
        Some(SchemaSnapshot::new(
            ["Symptom", "Disease", "Medicine"],
            ["HAS_SYMPTOM", "TREATED_BY"],
        ))
    }
}

/// Records every prompt; replies with a fixed text, or fails when `reply` is `None`
pub struct FakeLlm {
    reply: Option<String>,
    prompts: Mutex<Vec<String>>,
    schemas: Mutex<Vec<Option<Value>>>,
}

impl FakeLlm {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Some(text.to_string()),
            prompts: Mutex::new(Vec::new()),
            schemas: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            prompts: Mutex::new(Vec::new()),
            schemas: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    /// JSON schema attached to each request, if any
    pub fn schemas(&self) -> Vec<Option<Value>> {
        self.schemas.lock().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().len()
    }
}

#[async_trait]
impl LlmGenerationClient for FakeLlm {
    async fn generate(&self, request: LlmGenerateRequest<'_>) -> Result<LlmGenerateResponse, LlmError> {
        self.prompts.lock().push(request.user_prompt.to_string());
        self.schemas.lock().push(match &request.output_format {
            Some(OutputFormat::JsonSchema { schema, .. }) => Some(schema.clone().into_owned()),
            None => None,
        });
        match &self.reply {
            Some(text) => Ok(LlmGenerateResponse { text: text.clone() }),
            None => Err(LlmError::Api {
                status: 503,
                body: "overloaded".to_string(),
            }),
        }
    }

    fn model(&self) -> &str {
        "fake-llm"
    }
}

/// Deterministic, never-zero vectors derived from the text bytes
pub struct HashEmbedder;

impl HashEmbedder {
    pub fn vector(text: &str) -> Vec<f32> {
        let mut v = vec![1.0f32; DIMENSION];
        for (i, b) in text.bytes().enumerate() {
            v[i % DIMENSION] += (b % 17) as f32;
        }
        v
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, text: &str) -> EmbeddingResult<Vec<f32>> {
        Ok(Self::vector(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> EmbeddingResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }

    fn dimension(&self) -> usize {
        DIMENSION
    }
}

#[derive(Default)]
pub struct StaticLiterature {
    pub items: Vec<LiteratureItem>,
    pub fail: bool,
}

#[async_trait]
impl LiteratureSource for StaticLiterature {
    async fn search(&self, _query: &str, max_results: usize) -> LiteratureResult<Vec<LiteratureItem>> {
        if self.fail {
            return Err(LiteratureError::Api {
                status: 429,
                body: "rate limited".to_string(),
            });
        }
        Ok(self.items.iter().take(max_results).cloned().collect())
    }
}

pub fn article(id: u64, title: &str) -> LiteratureItem {
    LiteratureItem {
        id,
        title: title.to_string(),
        abstract_text: format!("abstract of {}", title),
        keywords: vec![],
    }
}

pub struct Pipeline {
    pub orchestrator: Arc<ChatOrchestrator>,
    pub llm: Arc<FakeLlm>,
    pub store: Arc<VectorStoreService>,
}

pub struct PipelineBuilder {
    graph: FakeGraph,
    literature: StaticLiterature,
    indexed: Vec<LiteratureItem>,
    llm: FakeLlm,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            graph: FakeGraph::default(),
            literature: StaticLiterature::default(),
            indexed: Vec::new(),
            llm: FakeLlm::replying("Here is what I found."),
        }
    }

    pub fn graph(mut self, graph: FakeGraph) -> Self {
        self.graph = graph;
        self
    }

    pub fn literature(mut self, literature: StaticLiterature) -> Self {
        self.literature = literature;
        self
    }

    /// Articles already present in the vector index before the first message
    pub fn indexed(mut self, items: Vec<LiteratureItem>) -> Self {
        self.indexed = items;
        self
    }

    pub fn llm(mut self, llm: FakeLlm) -> Self {
        self.llm = llm;
        self
    }

    pub async fn build(self) -> Pipeline {
        let store = Arc::new(VectorStoreService::new(
            Arc::new(InMemoryVectorBackend::new()),
            COLLECTION,
            DIMENSION,
        ));

        if !self.indexed.is_empty() {
            let ids: Vec<u64> = self.indexed.iter().map(|i| i.id).collect();
            let vectors = self.indexed.iter().map(|i| HashEmbedder::vector(&i.abstract_text)).collect();
            let payloads = self.indexed.iter().map(LiteratureItem::index_payload).collect();
            store.upsert(&ids, vectors, payloads).await.unwrap();
        }

        let embedder: Arc<dyn Embedder> = Arc::new(HashEmbedder);
        let llm = Arc::new(self.llm);
        let vocabulary: Vec<String> = DEFAULT_SYMPTOM_VOCABULARY.iter().map(|s| s.to_string()).collect();

        let orchestrator = Arc::new(ChatOrchestrator::new(PipelineComponents {
            extractor: Arc::new(KeywordExtractor::new(&vocabulary).unwrap()),
            graph: Arc::new(GraphService::new(Arc::new(self.graph), Duration::from_secs(60))),
            embedder: embedder.clone(),
            vector_store: store.clone(),
            literature: Arc::new(LiteratureService::new(
                Arc::new(self.literature),
                embedder,
                store.clone(),
            )),
            composer: ResponseComposer::new(llm.clone()),
            top_k: 5,
            max_results: 10,
        }));

        Pipeline {
            orchestrator,
            llm,
            store,
        }
    }
}
