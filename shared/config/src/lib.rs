pub mod vocabulary;

pub use vocabulary::{load_vocabulary, normalize_vocabulary, DEFAULT_SYMPTOM_VOCABULARY};

use thiserror::Error;

/// Name of the vector collection holding PubMed abstracts
pub const DEFAULT_COLLECTION: &str = "pubmed_articles";
/// Output size of the SapBERT embedding model
pub const DEFAULT_EMBEDDING_DIMENSION: usize = 768;
pub const DEFAULT_EMBEDDING_MODEL: &str = "cambridgeltl/SapBERT-from-PubMedBERT-fulltext";
pub const DEFAULT_LLM_MODEL: &str = "gemini-1.5-flash";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required configuration: {}", .0.join(", "))]
    Missing(Vec<String>),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: String, value: String },

    #[error("Failed to load symptom vocabulary from {path}: {reason}")]
    Vocabulary { path: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorBackendKind {
    Qdrant,
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractorKind {
    Keyword,
    Llm,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct Neo4jConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub schema_ttl_secs: u64,
}

#[derive(Debug, Clone)]
pub struct VectorConfig {
    pub backend: VectorBackendKind,
    pub url: String,
    pub api_key: Option<String>,
    pub collection: String,
    pub dimension: usize,
    pub top_k: usize,
}

#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub api_base: String,
    pub api_token: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_base: String,
    pub api_key: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct EntrezConfig {
    pub api_base: String,
    pub api_key: String,
    pub email: String,
    pub tool: String,
    pub max_results: usize,
}

/// Process configuration, validated once at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub neo4j: Neo4jConfig,
    pub vector: VectorConfig,
    pub embedding: EmbeddingConfig,
    pub llm: LlmConfig,
    pub entrez: EntrezConfig,
    pub extractor: ExtractorKind,
    pub vocabulary: Vec<String>,
    pub http_timeout_secs: u64,
}

impl AppConfig {
    /// Load `.env` (if present) and read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Every credential the pipeline needs is checked here so that a missing
    /// one aborts startup instead of failing on first use. All missing keys
    /// are reported together.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |keys: &[&str]| {
            keys.iter()
                .filter_map(|k| lookup(*k))
                .map(|v| v.trim().to_string())
                .find(|v| !v.is_empty())
        };
        let mut missing = Vec::new();
        let mut require = |keys: &[&str]| {
            get(keys).unwrap_or_else(|| {
                missing.push(keys[0].to_string());
                String::new()
            })
        };

        let backend = match get(&["VECTOR_BACKEND"]).as_deref() {
            None | Some("qdrant") => VectorBackendKind::Qdrant,
            Some("memory") => VectorBackendKind::Memory,
            Some(other) => return Err(invalid("VECTOR_BACKEND", other)),
        };

        let neo4j_uri = require(&["NEO4J_URI"]);
        let neo4j_user = require(&["NEO4J_USER"]);
        let neo4j_password = require(&["NEO4J_PASSWORD"]);
        let vector_url = match backend {
            VectorBackendKind::Qdrant => require(&["QDRANT_URL", "QDRANT_API_URL"]),
            VectorBackendKind::Memory => String::new(),
        };
        let llm_key = require(&["LLM_API_KEY", "ANALYZER_API_KEY"]);
        let embedding_token = require(&["EMBEDDING_API_TOKEN", "HF_API_TOKEN"]);
        let entrez_key = require(&["ENTREZ_API_KEY"]);

        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let extractor = match get(&["SYMPTOM_EXTRACTOR"]).as_deref() {
            None | Some("keyword") => ExtractorKind::Keyword,
            Some("llm") => ExtractorKind::Llm,
            Some(other) => return Err(invalid("SYMPTOM_EXTRACTOR", other)),
        };

        let vocabulary = load_vocabulary(get(&["SYMPTOM_VOCABULARY_PATH"]).as_deref())?;

        Ok(Self {
            server: ServerConfig {
                host: get(&["CHAT_HOST"]).unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_or(get(&["CHAT_PORT"]), "CHAT_PORT", 5000)?,
            },
            neo4j: Neo4jConfig {
                uri: neo4j_uri,
                user: neo4j_user,
                password: neo4j_password,
                schema_ttl_secs: parse_or(get(&["GRAPH_SCHEMA_TTL_SECS"]), "GRAPH_SCHEMA_TTL_SECS", 300)?,
            },
            vector: VectorConfig {
                backend,
                url: vector_url,
                api_key: get(&["QDRANT_API_KEY"]),
                collection: DEFAULT_COLLECTION.to_string(),
                dimension: DEFAULT_EMBEDDING_DIMENSION,
                top_k: parse_or(get(&["VECTOR_TOP_K"]), "VECTOR_TOP_K", 5)?,
            },
            embedding: EmbeddingConfig {
                api_base: get(&["EMBEDDING_API_BASE"])
                    .unwrap_or_else(|| "https://api-inference.huggingface.co".to_string()),
                api_token: embedding_token,
                model: get(&["EMBEDDING_MODEL"]).unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            },
            llm: LlmConfig {
                api_base: get(&["LLM_API_BASE"])
                    .unwrap_or_else(|| "https://generativelanguage.googleapis.com".to_string()),
                api_key: llm_key,
                model: get(&["LLM_MODEL"]).unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            },
            entrez: EntrezConfig {
                api_base: get(&["ENTREZ_API_BASE"])
                    .unwrap_or_else(|| "https://eutils.ncbi.nlm.nih.gov/entrez/eutils".to_string()),
                api_key: entrez_key,
                email: get(&["ENTREZ_EMAIL"]).unwrap_or_else(|| "medisense@example.org".to_string()),
                tool: get(&["ENTREZ_TOOL"]).unwrap_or_else(|| "medisense".to_string()),
                max_results: parse_or(get(&["LITERATURE_MAX_RESULTS"]), "LITERATURE_MAX_RESULTS", 10)?,
            },
            extractor,
            vocabulary,
            http_timeout_secs: parse_or(get(&["HTTP_TIMEOUT_SECS"]), "HTTP_TIMEOUT_SECS", 30)?,
        })
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, key: &str, default: T) -> Result<T, ConfigError> {
    match value {
        Some(v) => v.parse().map_err(|_| invalid(key, &v)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn required() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("NEO4J_URI", "bolt://localhost:7687"),
            ("NEO4J_USER", "neo4j"),
            ("NEO4J_PASSWORD", "secret"),
            ("QDRANT_URL", "http://localhost:6334"),
            ("LLM_API_KEY", "llm-key"),
            ("EMBEDDING_API_TOKEN", "hf-token"),
            ("ENTREZ_API_KEY", "entrez-key"),
        ])
    }

    fn load(vars: &HashMap<&'static str, &'static str>) -> Result<AppConfig, ConfigError> {
        AppConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()))
    }

    #[test]
    fn test_defaults_applied() {
        let config = load(&required()).unwrap();

        assert_eq!(config.server.port, 5000);
        assert_eq!(config.vector.collection, "pubmed_articles");
        assert_eq!(config.vector.dimension, 768);
        assert_eq!(config.vector.top_k, 5);
        assert_eq!(config.vector.backend, VectorBackendKind::Qdrant);
        assert!(config.vector.api_key.is_none());
        assert_eq!(config.entrez.max_results, 10);
        assert_eq!(config.extractor, ExtractorKind::Keyword);
        assert_eq!(config.neo4j.schema_ttl_secs, 300);
        assert!(config.vocabulary.contains(&"headache".to_string()));
    }

    #[test]
    fn test_missing_credentials_reported_together() {
        let mut vars = required();
        vars.remove("ENTREZ_API_KEY");
        vars.remove("NEO4J_PASSWORD");

        match load(&vars) {
            Err(ConfigError::Missing(keys)) => {
                assert_eq!(keys, vec!["NEO4J_PASSWORD".to_string(), "ENTREZ_API_KEY".to_string()]);
            }
            other => panic!("expected missing error, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let mut vars = required();
        vars.insert("ENTREZ_API_KEY", "   ");
        assert!(matches!(load(&vars), Err(ConfigError::Missing(_))));
    }

    #[test]
    fn test_legacy_aliases() {
        let mut vars = required();
        vars.remove("QDRANT_URL");
        vars.remove("LLM_API_KEY");
        vars.insert("QDRANT_API_URL", "http://qdrant:6334");
        vars.insert("ANALYZER_API_KEY", "legacy");

        let config = load(&vars).unwrap();
        assert_eq!(config.vector.url, "http://qdrant:6334");
        assert_eq!(config.llm.api_key, "legacy");
    }

    #[test]
    fn test_memory_backend_needs_no_qdrant_url() {
        let mut vars = required();
        vars.remove("QDRANT_URL");
        vars.insert("VECTOR_BACKEND", "memory");

        let config = load(&vars).unwrap();
        assert_eq!(config.vector.backend, VectorBackendKind::Memory);
    }

    #[test]
    fn test_invalid_values() {
        let mut vars = required();
        vars.insert("CHAT_PORT", "not-a-port");
        assert!(matches!(load(&vars), Err(ConfigError::Invalid { .. })));

        let mut vars = required();
        vars.insert("SYMPTOM_EXTRACTOR", "magic");
        assert!(matches!(load(&vars), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_llm_extractor_selected() {
        let mut vars = required();
        vars.insert("SYMPTOM_EXTRACTOR", "llm");
        assert_eq!(load(&vars).unwrap().extractor, ExtractorKind::Llm);
    }
}
