use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeSet;
use std::fmt;

/// Placeholder used when an article carries no title or abstract
pub const MISSING_TEXT: &str = "n/a";

/// Lower-case and trim a symptom term.
pub fn normalize_symptom(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Node labels and relationship types present in the graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    pub nodes: BTreeSet<String>,
    pub relationships: BTreeSet<String>,
}

impl SchemaSnapshot {
    pub fn new<N, R>(nodes: N, relationships: R) -> Self
    where
        N: IntoIterator,
        N::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            nodes: nodes.into_iter().map(Into::into).collect(),
            relationships: relationships.into_iter().map(Into::into).collect(),
        }
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.nodes.contains(label)
    }

    pub fn has_relationship(&self, rel_type: &str) -> bool {
        self.relationships.contains(rel_type)
    }
}

/// One disease/medicine pair returned by the treatment traversal
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphRecord {
    pub disease: String,
    pub medicine: String,
}

impl GraphRecord {
    pub fn new(disease: impl Into<String>, medicine: impl Into<String>) -> Self {
        Self {
            disease: disease.into(),
            medicine: medicine.into(),
        }
    }
}

/// A normalized PubMed article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteratureItem {
    /// PubMed identifier (PMID)
    pub id: u64,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub keywords: Vec<String>,
}

impl LiteratureItem {
    /// Payload stored next to the article's embedding in the vector index
    pub fn index_payload(&self) -> Map<String, Value> {
        let mut payload = Map::new();
        payload.insert("title".to_string(), json!(self.title));
        payload.insert("abstract".to_string(), json!(self.abstract_text));
        payload
    }
}

/// A nearest-neighbour result decoded from the vector index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorHit {
    pub id: u64,
    pub score: f32,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
}

impl VectorHit {
    /// Build a hit from a stored `{title, abstract}` payload.
    pub fn from_payload(id: u64, score: f32, payload: &Map<String, Value>) -> Self {
        let text = |key: &str| {
            payload
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or(MISSING_TEXT)
                .to_string()
        };

        Self {
            id,
            score,
            title: text("title"),
            abstract_text: text("abstract"),
        }
    }
}

/// Which evidence stage produced a [`CombinedResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultSource {
    Graph,
    VectorIndex,
    Literature,
}

impl ResultSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultSource::Graph => "graph",
            ResultSource::VectorIndex => "vector_index",
            ResultSource::Literature => "literature",
        }
    }

    /// Human-readable tag used in LLM prompts
    pub fn label(&self) -> &'static str {
        match self {
            ResultSource::Graph => "Knowledge Graph",
            ResultSource::VectorIndex => "Indexed Literature",
            ResultSource::Literature => "PubMed",
        }
    }
}

impl fmt::Display for ResultSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Evidence item in the merged per-request result list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedResult {
    pub source: ResultSource,
    pub data: Map<String, Value>,
}

impl CombinedResult {
    pub fn from_graph(record: &GraphRecord) -> Self {
        let mut data = Map::new();
        data.insert("disease".to_string(), json!(record.disease));
        data.insert("medicine".to_string(), json!(record.medicine));
        Self {
            source: ResultSource::Graph,
            data,
        }
    }

    pub fn from_hit(hit: &VectorHit) -> Self {
        let mut data = Map::new();
        data.insert("id".to_string(), json!(hit.id));
        data.insert("score".to_string(), json!(hit.score));
        data.insert("title".to_string(), json!(hit.title));
        data.insert("abstract".to_string(), json!(hit.abstract_text));
        Self {
            source: ResultSource::VectorIndex,
            data,
        }
    }

    pub fn from_literature(item: &LiteratureItem) -> Self {
        let mut data = item.index_payload();
        data.insert("id".to_string(), json!(item.id));
        data.insert("keywords".to_string(), json!(item.keywords));
        Self {
            source: ResultSource::Literature,
            data,
        }
    }

    /// String field lookup; `None` when absent or not a string.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    pub fn title(&self) -> Option<&str> {
        self.field("title")
    }

    pub fn abstract_text(&self) -> Option<&str> {
        self.field("abstract")
    }

    /// PubMed id for index and literature results
    pub fn article_id(&self) -> Option<u64> {
        self.data.get("id").and_then(Value::as_u64)
    }
}
