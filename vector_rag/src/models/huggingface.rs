use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::Embedder;
use crate::errors::{EmbeddingError, EmbeddingResult};

/// Request body for HuggingFace Inference API
#[derive(Debug, Clone, Serialize)]
pub struct HuggingFaceEmbeddingRequest<'a> {
    pub inputs: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<HuggingFaceOptions>,
}

/// Options for HuggingFace Inference API
#[derive(Debug, Clone, Serialize)]
pub struct HuggingFaceOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_for_model: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_cache: Option<bool>,
}

/// HuggingFace returns different shapes depending on the model's pipeline
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum HuggingFaceEmbeddingResponse {
    /// Pooled embeddings: [[f32, ...], [f32, ...]]
    DirectArray(Vec<Vec<f32>>),
    /// Token-level embeddings: [[[f32, ...] per token] per input]
    TokenEmbeddings(Vec<Vec<Vec<f32>>>),
    /// Structured response with embeddings field
    Structured { embeddings: Vec<Vec<f32>> },
    /// Error response from HuggingFace
    Error { error: String },
}

/// Embedding client for the HuggingFace Inference API.
///
/// SapBERT ships no pooling config, so token-level responses are mean-pooled
/// per input, as sentence-transformers does for such models.
pub struct HuggingFaceEmbedder {
    client: Client,
    api_token: String,
    inference_api_base: String,
    model_id: String,
    dimension: usize,
}

impl HuggingFaceEmbedder {
    pub fn new(
        api_base: &str,
        api_token: impl Into<String>,
        model_id: impl Into<String>,
        dimension: usize,
        timeout_secs: u64,
    ) -> EmbeddingResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_token: api_token.into(),
            inference_api_base: api_base.trim_end_matches('/').to_string(),
            model_id: model_id.into(),
            dimension,
        })
    }

    pub fn model_url(&self) -> String {
        format!("{}/models/{}", self.inference_api_base, self.model_id)
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn request_embeddings(&self, texts: &[String]) -> EmbeddingResult<Vec<Vec<f32>>> {
        let url = self.model_url();
        let request_body = HuggingFaceEmbeddingRequest {
            inputs: texts,
            options: Some(HuggingFaceOptions {
                wait_for_model: Some(true),
                use_cache: Some(true),
            }),
        };

        tracing::debug!("HuggingFace embedding request to {}: {} texts", url, texts.len());

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let response_text = response.text().await?;
        let embeddings = parse_response(&response_text)?;

        if embeddings.len() != texts.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: texts.len(),
                actual: embeddings.len(),
            });
        }
        for embedding in &embeddings {
            if embedding.len() != self.dimension {
                return Err(EmbeddingError::DimensionMismatch {
                    expected: self.dimension,
                    actual: embedding.len(),
                });
            }
        }

        tracing::debug!("HuggingFace returned {} embeddings", embeddings.len());
        Ok(embeddings)
    }
}

/// Average token vectors into one sentence vector
fn mean_pool(tokens: &[Vec<f32>]) -> Vec<f32> {
    if tokens.is_empty() {
        return Vec::new();
    }
    let width = tokens.iter().map(Vec::len).max().unwrap_or(0);

    let mut pooled = vec![0.0f32; width];
    for token in tokens {
        for (acc, value) in pooled.iter_mut().zip(token) {
            *acc += value;
        }
    }
    let count = tokens.len() as f32;
    pooled.iter_mut().for_each(|v| *v /= count);
    pooled
}

fn parse_response(response_text: &str) -> EmbeddingResult<Vec<Vec<f32>>> {
    match serde_json::from_str::<HuggingFaceEmbeddingResponse>(response_text) {
        Ok(HuggingFaceEmbeddingResponse::DirectArray(embeddings)) => Ok(embeddings),
        Ok(HuggingFaceEmbeddingResponse::TokenEmbeddings(per_input)) => {
            Ok(per_input.iter().map(|tokens| mean_pool(tokens)).collect())
        }
        Ok(HuggingFaceEmbeddingResponse::Structured { embeddings }) => Ok(embeddings),
        Ok(HuggingFaceEmbeddingResponse::Error { error }) => Err(EmbeddingError::Api { status: 200, body: error }),
        Err(e) => {
            let excerpt: String = response_text.chars().take(500).collect();
            Err(EmbeddingError::Parse(format!("{}. Response: {}", e, excerpt)))
        }
    }
}

#[async_trait]
impl Embedder for HuggingFaceEmbedder {
    async fn embed(&self, text: &str) -> EmbeddingResult<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }

        let mut embeddings = self.request_embeddings(&[text.to_string()]).await?;
        embeddings.pop().ok_or(EmbeddingError::CountMismatch { expected: 1, actual: 0 })
    }

    async fn embed_batch(&self, texts: &[String]) -> EmbeddingResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        if texts.iter().any(|t| t.trim().is_empty()) {
            return Err(EmbeddingError::EmptyInput);
        }
        self.request_embeddings(texts).await
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MODEL: &str = "cambridgeltl/SapBERT-from-PubMedBERT-fulltext";

    fn embedder(server: &MockServer, dimension: usize) -> HuggingFaceEmbedder {
        HuggingFaceEmbedder::new(&server.uri(), "hf-token", MODEL, dimension, 5).unwrap()
    }

    #[test]
    fn test_url_construction() {
        let embedder =
            HuggingFaceEmbedder::new("https://api-inference.huggingface.co/", "t", MODEL, 768, 5).unwrap();
        assert_eq!(
            embedder.model_url(),
            "https://api-inference.huggingface.co/models/cambridgeltl/SapBERT-from-PubMedBERT-fulltext"
        );
        assert_eq!(embedder.dimension(), 768);
    }

    #[test]
    fn test_token_level_response_is_mean_pooled() {
        let parsed = parse_response("[[[1.0, 0.0], [3.0, 4.0]], [[5.0, 6.0]]]").unwrap();
        assert_eq!(parsed, vec![vec![2.0, 2.0], vec![5.0, 6.0]]);
    }

    #[test]
    fn test_mean_pool_of_no_tokens_is_empty() {
        assert!(mean_pool(&[]).is_empty());
    }

    #[test]
    fn test_error_body_parsed() {
        let err = parse_response(r#"{"error": "Model is loading"}"#).unwrap_err();
        assert!(matches!(err, EmbeddingError::Api { body, .. } if body == "Model is loading"));
    }

    #[tokio::test]
    async fn test_embed_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/models/{}", MODEL)))
            .and(header("authorization", "Bearer hf-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([[0.1, 0.2, 0.3]])))
            .expect(1)
            .mount(&server)
            .await;

        let vector = embedder(&server, 3).embed("persistent cough").await.unwrap();
        assert_eq!(vector, vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn test_empty_text_rejected_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = embedder(&server, 3).embed("   ").await.unwrap_err();
        assert!(matches!(err, EmbeddingError::EmptyInput));
    }

    #[tokio::test]
    async fn test_wrong_dimension_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([[0.1, 0.2]])))
            .mount(&server)
            .await;

        let err = embedder(&server, 768).embed("fever").await.unwrap_err();
        assert!(matches!(
            err,
            EmbeddingError::DimensionMismatch { expected: 768, actual: 2 }
        ));
    }

    #[tokio::test]
    async fn test_api_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&server)
            .await;

        let err = embedder(&server, 3).embed("fever").await.unwrap_err();
        assert!(matches!(err, EmbeddingError::Api { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_batch_preserves_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([[1.0, 0.0], [0.0, 1.0]])))
            .mount(&server)
            .await;

        let texts = vec!["first".to_string(), "second".to_string()];
        let vectors = embedder(&server, 2).embed_batch(&texts).await.unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }
}
