use async_trait::async_trait;
use medisense_llm::{LlmGenerateRequest, LlmGenerationClient};
use medisense_models::normalize_symptom;
use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Pulls symptom terms out of free text.
///
/// Output is normalized, distinct and possibly empty. Failures are logged and
/// read as "no symptoms".
#[async_trait]
pub trait SymptomExtractor: Send + Sync {
    async fn extract(&self, text: &str) -> Vec<String>;
}

fn dedup_normalized<I: IntoIterator<Item = String>>(items: I) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items.into_iter().map(|s| normalize_symptom(&s)) {
        if !item.is_empty() && !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

/// Whole-word, case-insensitive matching against a fixed vocabulary
pub struct KeywordExtractor {
    entries: Vec<(String, Regex)>,
}

impl KeywordExtractor {
    pub fn new(vocabulary: &[String]) -> Result<Self, regex::Error> {
        let entries = dedup_normalized(vocabulary.iter().cloned())
            .into_iter()
            .map(|term| {
                let words: Vec<String> = term.split_whitespace().map(regex::escape).collect();
                // \b would never match next to a leading or trailing symbol such as "c++"
                let pattern = format!(r"(?:^|\W){}(?:\W|$)", words.join(r"\s+"));
                let regex = RegexBuilder::new(&pattern).case_insensitive(true).build()?;
                Ok((term, regex))
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;

        Ok(Self { entries })
    }

    pub fn vocabulary(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(term, _)| term.as_str())
    }

    /// Every vocabulary entry present in `text`, in vocabulary order
    pub fn matches(&self, text: &str) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, regex)| regex.is_match(text))
            .map(|(term, _)| term.clone())
            .collect()
    }
}

#[async_trait]
impl SymptomExtractor for KeywordExtractor {
    async fn extract(&self, text: &str) -> Vec<String> {
        let symptoms = self.matches(text);
        tracing::debug!(symptoms = ?symptoms, "Keyword extraction");
        symptoms
    }
}

const EXTRACTION_INSTRUCTION: &str = "You identify medical symptoms in patient messages. \
Reply with JSON of the form {\"symptoms\": [\"...\"]} listing each symptom the user reports \
as a short lowercase phrase. If no symptoms are present, reply with {\"symptoms\": []}.";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ExtractedSymptoms {
    symptoms: Vec<String>,
}

/// Delegates extraction to the LLM under a JSON schema contract
pub struct LlmExtractor {
    llm: Arc<dyn LlmGenerationClient>,
    schema: Value,
}

impl LlmExtractor {
    pub fn new(llm: Arc<dyn LlmGenerationClient>) -> Self {
        Self {
            llm,
            schema: json!({
                "type": "object",
                "properties": {
                    "symptoms": {"type": "array", "items": {"type": "string"}}
                },
                "required": ["symptoms"]
            }),
        }
    }

    pub fn parse_reply(text: &str) -> Result<Vec<String>, serde_json::Error> {
        let parsed: ExtractedSymptoms = serde_json::from_str(text.trim())?;
        Ok(dedup_normalized(parsed.symptoms))
    }
}

#[async_trait]
impl SymptomExtractor for LlmExtractor {
    async fn extract(&self, text: &str) -> Vec<String> {
        let prompt = format!(
            "The user said: '{}'. Extract symptoms if present; otherwise, return an empty list.",
            text
        );
        let request = LlmGenerateRequest::new(prompt)
            .with_system_prompt(EXTRACTION_INSTRUCTION)
            .with_json_schema("symptoms", &self.schema);

        let reply = match self.llm.generate(request).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!(error = %e, "Symptom extraction request failed");
                return Vec::new();
            }
        };

        match Self::parse_reply(&reply.text) {
            Ok(symptoms) => {
                tracing::debug!(symptoms = ?symptoms, "LLM extraction");
                symptoms
            }
            Err(e) => {
                tracing::error!(error = %e, "Error parsing symptom extraction response");
                Vec::new()
            }
        }
    }
}
