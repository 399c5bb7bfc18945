use graph_rag::GraphService;
use literature::LiteratureService;
use medisense_models::{CombinedResult, GraphRecord, LiteratureItem, VectorHit};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use vector_rag::{Embedder, VectorStoreService};

use super::composer::{ResponseComposer, NO_INFORMATION};
use super::extractor::SymptomExtractor;
use crate::errors::ChatError;

/// Which path produced a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    /// No symptoms; friendly small talk
    Conversational,
    /// Graph rows were the only evidence
    GraphOnly,
    /// Evidence from the vector index or PubMed, possibly with graph rows
    Combined,
    /// Every stage came back empty
    NoInformation,
}

impl ReplyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplyKind::Conversational => "conversational",
            ReplyKind::GraphOnly => "graph_only",
            ReplyKind::Combined => "combined",
            ReplyKind::NoInformation => "no_information",
        }
    }
}

impl fmt::Display for ReplyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub text: String,
    pub kind: ReplyKind,
    pub symptoms: Vec<String>,
}

/// Everything the pipeline talks to, built once at startup
pub struct PipelineComponents {
    pub extractor: Arc<dyn SymptomExtractor>,
    pub graph: Arc<GraphService>,
    pub embedder: Arc<dyn Embedder>,
    pub vector_store: Arc<VectorStoreService>,
    pub literature: Arc<LiteratureService>,
    pub composer: ResponseComposer,
    /// Hits requested from the vector index
    pub top_k: usize,
    /// Articles requested from PubMed
    pub max_results: usize,
}

/// Evidence collected for one message, already merged and deduplicated
#[derive(Debug, Default)]
pub struct Evidence {
    pub graph: Vec<GraphRecord>,
    pub hits: Vec<VectorHit>,
    pub literature: Vec<LiteratureItem>,
}

impl Evidence {
    /// Merge stage outputs: graph pairs first (deduplicated), then vector
    /// hits, then fresh literature not already among the hits.
    pub fn merge(graph: Vec<GraphRecord>, hits: Vec<VectorHit>, literature: Vec<LiteratureItem>) -> Self {
        let mut seen_pairs = HashSet::new();
        let graph: Vec<GraphRecord> = graph.into_iter().filter(|r| seen_pairs.insert(r.clone())).collect();

        let hit_ids: HashSet<u64> = hits.iter().map(|h| h.id).collect();
        let literature: Vec<LiteratureItem> = literature
            .into_iter()
            .filter(|item| !hit_ids.contains(&item.id))
            .collect();

        Self {
            graph,
            hits,
            literature,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty() && self.hits.is_empty() && self.literature.is_empty()
    }

    pub fn is_graph_only(&self) -> bool {
        !self.graph.is_empty() && self.hits.is_empty() && self.literature.is_empty()
    }

    pub fn combined_results(&self) -> Vec<CombinedResult> {
        self.graph
            .iter()
            .map(CombinedResult::from_graph)
            .chain(self.hits.iter().map(CombinedResult::from_hit))
            .chain(self.literature.iter().map(CombinedResult::from_literature))
            .collect()
    }
}

/// Per-message pipeline: extract symptoms, gather evidence from the graph,
/// the vector index and PubMed in parallel, then compose a reply.
pub struct ChatOrchestrator {
    parts: PipelineComponents,
}

impl ChatOrchestrator {
    pub fn new(parts: PipelineComponents) -> Self {
        Self { parts }
    }

    pub async fn extract_symptoms(&self, message: &str) -> Vec<String> {
        self.parts.extractor.extract(message).await
    }

    pub async fn handle_message(&self, message: &str) -> Result<ChatReply, ChatError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        let symptoms = self.extract_symptoms(message).await;
        self.respond(message, symptoms).await
    }

    /// Reply to `message` given symptoms already extracted from it
    pub async fn respond(&self, message: &str, symptoms: Vec<String>) -> Result<ChatReply, ChatError> {
        let start = Instant::now();

        let (text, kind) = if symptoms.is_empty() {
            let text = self.parts.composer.compose_conversational(message).await?;
            (text, ReplyKind::Conversational)
        } else {
            let evidence = self.gather_evidence(&symptoms).await;
            self.compose(&evidence, &symptoms).await
        };

        tracing::info!(
            kind = %kind,
            symptoms = ?symptoms,
            duration_ms = start.elapsed().as_millis() as u64,
            "Reply composed"
        );

        Ok(ChatReply { text, kind, symptoms })
    }

    pub async fn gather_evidence(&self, symptoms: &[String]) -> Evidence {
        let query = symptoms.join(" ");

        let (graph, hits, literature) = tokio::join!(
            self.query_graph(symptoms),
            self.search_vectors(&query),
            self.fetch_literature(&query),
        );

        tracing::debug!(
            graph = graph.len(),
            hits = hits.len(),
            literature = literature.len(),
            "Evidence stages finished"
        );
        Evidence::merge(graph, hits, literature)
    }

    async fn compose(&self, evidence: &Evidence, symptoms: &[String]) -> (String, ReplyKind) {
        if evidence.is_empty() {
            return (NO_INFORMATION.to_string(), ReplyKind::NoInformation);
        }
        if evidence.is_graph_only() {
            let text = self.parts.composer.compose_graph_only(&evidence.graph).await;
            return (text, ReplyKind::GraphOnly);
        }
        let text = self
            .parts
            .composer
            .compose_combined(&evidence.combined_results(), symptoms)
            .await;
        (text, ReplyKind::Combined)
    }

    async fn query_graph(&self, symptoms: &[String]) -> Vec<GraphRecord> {
        match self.parts.graph.lookup_treatments(symptoms).await {
            Ok(records) => records,
            Err(e) => {
                tracing::error!(error = %e, "Graph query failed");
                Vec::new()
            }
        }
    }

    async fn search_vectors(&self, query: &str) -> Vec<VectorHit> {
        let embedding = match self.parts.embedder.embed(query).await {
            Ok(embedding) => embedding,
            Err(e) => {
                tracing::error!(error = %e, "Failed to embed symptom query");
                return Vec::new();
            }
        };
        match self.parts.vector_store.search(&embedding, self.parts.top_k).await {
            Ok(hits) => hits,
            Err(e) => {
                tracing::error!(error = %e, "Vector search rejected query");
                Vec::new()
            }
        }
    }

    async fn fetch_literature(&self, query: &str) -> Vec<LiteratureItem> {
        match self
            .parts
            .literature
            .fetch_and_store(query, self.parts.max_results)
            .await
        {
            Ok(items) => items,
            Err(e) => {
                tracing::error!(error = %e, "Literature fetch failed");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(id: u64) -> VectorHit {
        VectorHit {
            id,
            score: 0.5,
            title: format!("hit {}", id),
            abstract_text: "n/a".to_string(),
        }
    }

    fn item(id: u64) -> LiteratureItem {
        LiteratureItem {
            id,
            title: format!("item {}", id),
            abstract_text: "n/a".to_string(),
            keywords: vec![],
        }
    }

    #[test]
    fn test_merge_order_and_dedup() {
        let evidence = Evidence::merge(
            vec![
                GraphRecord::new("Migraine", "Ibuprofen"),
                GraphRecord::new("Migraine", "Ibuprofen"),
                GraphRecord::new("Migraine", "Aspirin"),
            ],
            vec![hit(1), hit(2)],
            vec![item(2), item(3)],
        );

        assert_eq!(evidence.graph.len(), 2);
        assert_eq!(evidence.literature, vec![item(3)]);

        let ids: Vec<Option<u64>> = evidence.combined_results().iter().map(|r| r.article_id()).collect();
        assert_eq!(ids, vec![None, None, Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn test_graph_only_classification() {
        let graph_only = Evidence::merge(vec![GraphRecord::new("Flu", "Rest")], vec![], vec![]);
        assert!(graph_only.is_graph_only());

        let mixed = Evidence::merge(vec![GraphRecord::new("Flu", "Rest")], vec![], vec![item(1)]);
        assert!(!mixed.is_graph_only());
        assert!(Evidence::default().is_empty());
    }

    #[test]
    fn test_reply_kind_labels() {
        assert_eq!(ReplyKind::GraphOnly.to_string(), "graph_only");
        assert_eq!(ReplyKind::NoInformation.as_str(), "no_information");
    }
}
