use async_trait::async_trait;
use serde_json::Value;
use std::borrow::Cow;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("LLM request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("LLM API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("LLM returned no text")]
    EmptyResponse,

    #[error("Failed to parse LLM response: {0}")]
    Parse(String),
}

#[derive(Debug, Clone)]
pub enum OutputFormat<'a> {
    /// Constrain the reply to JSON matching `schema`
    JsonSchema {
        name: Cow<'a, str>,
        schema: Cow<'a, Value>,
    },
}

#[derive(Debug, Clone)]
pub struct LlmGenerateRequest<'a> {
    pub system_prompt: Option<Cow<'a, str>>,
    pub user_prompt: Cow<'a, str>,
    pub output_format: Option<OutputFormat<'a>>,
}

impl<'a> LlmGenerateRequest<'a> {
    pub fn new(user_prompt: impl Into<Cow<'a, str>>) -> Self {
        Self {
            system_prompt: None,
            user_prompt: user_prompt.into(),
            output_format: None,
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<Cow<'a, str>>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_json_schema(mut self, name: impl Into<Cow<'a, str>>, schema: &'a Value) -> Self {
        self.output_format = Some(OutputFormat::JsonSchema {
            name: name.into(),
            schema: Cow::Borrowed(schema),
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LlmGenerateResponse {
    pub text: String,
}

#[async_trait]
pub trait LlmGenerationClient: Send + Sync {
    async fn generate(&self, request: LlmGenerateRequest<'_>) -> Result<LlmGenerateResponse, LlmError>;

    /// Model identifier, for logs
    fn model(&self) -> &str;
}
