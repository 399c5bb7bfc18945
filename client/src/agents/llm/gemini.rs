use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::llm::{LlmError, LlmGenerateRequest, LlmGenerateResponse, LlmGenerationClient, OutputFormat};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    response_mime_type: String,
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
pub struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
pub struct GeminiCandidate {
    content: Option<GeminiContent>,
}

/// Client for the Gemini `generateContent` endpoint
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }
}

/// Gemini's schema dialect spells types in upper case
fn to_gemini_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| {
                    let value = match (key.as_str(), value) {
                        ("type", Value::String(t)) => Value::String(t.to_uppercase()),
                        _ => to_gemini_schema(value),
                    };
                    (key.clone(), value)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(to_gemini_schema).collect()),
        other => other.clone(),
    }
}

fn create_gemini_request(request: &LlmGenerateRequest<'_>) -> GeminiRequest {
    let text_content = |role: Option<&str>, text: &str| GeminiContent {
        role: role.map(str::to_string),
        parts: vec![GeminiPart { text: text.to_string() }],
    };

    GeminiRequest {
        contents: vec![text_content(Some("user"), request.user_prompt.as_ref())],
        system_instruction: request
            .system_prompt
            .as_ref()
            .map(|system| text_content(None, system.as_ref())),
        generation_config: request.output_format.as_ref().map(|format| match format {
            OutputFormat::JsonSchema { schema, .. } => GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: to_gemini_schema(schema),
            },
        }),
    }
}

#[async_trait]
impl LlmGenerationClient for GeminiClient {
    async fn generate(&self, request: LlmGenerateRequest<'_>) -> Result<LlmGenerateResponse, LlmError> {
        let gemini_request = create_gemini_request(&request);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&gemini_request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        let text: String = gemini_response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| content.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }

        tracing::debug!(model = %self.model, chars = text.len(), "Gemini generation complete");
        Ok(LlmGenerateResponse { text })
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> GeminiClient {
        GeminiClient::new(&server.uri(), "gemini-key", "gemini-1.5-flash", 5).unwrap()
    }

    fn reply(text: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]
        }))
    }

    #[test]
    fn test_schema_types_uppercased() {
        let schema = json!({
            "type": "object",
            "properties": {"symptoms": {"type": "array", "items": {"type": "string"}}},
            "required": ["symptoms"]
        });
        let converted = to_gemini_schema(&schema);
        assert_eq!(converted["type"], "OBJECT");
        assert_eq!(converted["properties"]["symptoms"]["type"], "ARRAY");
        assert_eq!(converted["properties"]["symptoms"]["items"]["type"], "STRING");
        assert_eq!(converted["required"], json!(["symptoms"]));
    }

    #[tokio::test]
    async fn test_generate_plain_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .and(header("x-goog-api-key", "gemini-key"))
            .and(body_partial_json(json!({
                "contents": [{"role": "user", "parts": [{"text": "hello"}]}]
            })))
            .respond_with(reply("Hi there!"))
            .expect(1)
            .mount(&server)
            .await;

        let response = client(&server).generate(LlmGenerateRequest::new("hello")).await.unwrap();
        assert_eq!(response.text, "Hi there!");
    }

    #[tokio::test]
    async fn test_json_schema_sets_generation_config() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "systemInstruction": {"parts": [{"text": "extract"}]},
                "generationConfig": {
                    "responseMimeType": "application/json",
                    "responseSchema": {"type": "OBJECT"}
                }
            })))
            .respond_with(reply(r#"{"symptoms": ["fever"]}"#))
            .expect(1)
            .mount(&server)
            .await;

        let schema = json!({"type": "object"});
        let request = LlmGenerateRequest::new("I have a fever")
            .with_system_prompt("extract")
            .with_json_schema("symptoms", &schema);
        let response = client(&server).generate(request).await.unwrap();
        assert_eq!(response.text, r#"{"symptoms": ["fever"]}"#);
    }

    #[tokio::test]
    async fn test_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
            .mount(&server)
            .await;

        let err = client(&server).generate(LlmGenerateRequest::new("hi")).await.unwrap_err();
        assert!(matches!(err, LlmError::Api { status: 403, .. }));
    }

    #[tokio::test]
    async fn test_no_candidates_is_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
            .mount(&server)
            .await;

        let err = client(&server).generate(LlmGenerateRequest::new("hi")).await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyResponse));
    }
}
