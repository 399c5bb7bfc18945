use medisense_llm::{LlmError, LlmGenerateRequest, LlmGenerationClient};
use medisense_models::{CombinedResult, GraphRecord, ResultSource, MISSING_TEXT};
use std::sync::Arc;

/// Returned when an evidence-based reply cannot be generated
pub const GENERATION_FALLBACK: &str =
    "I'm sorry, but I couldn't generate a response. Please consult a healthcare professional.";

/// Returned, without calling the LLM, when no stage found anything
pub const NO_INFORMATION: &str =
    "I'm sorry, I couldn't find much information. Please consult a healthcare professional.";

const EXCERPT_CHARS: usize = 200;

/// First `max_chars` characters of `text`, marked with "..." when cut
pub fn excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

/// One line per disease with its distinct medicines, in first-seen order
pub fn graph_summary(records: &[GraphRecord]) -> String {
    let mut grouped: Vec<(&str, Vec<&str>)> = Vec::new();
    for record in records {
        let idx = match grouped.iter().position(|(d, _)| *d == record.disease) {
            Some(idx) => idx,
            None => {
                grouped.push((record.disease.as_str(), Vec::new()));
                grouped.len() - 1
            }
        };
        let medicines = &mut grouped[idx].1;
        if !medicines.contains(&record.medicine.as_str()) {
            medicines.push(record.medicine.as_str());
        }
    }

    grouped
        .iter()
        .map(|(disease, medicines)| format!("- {}: {}", disease, medicines.join(", ")))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn graph_only_prompt(records: &[GraphRecord]) -> String {
    format!(
        "The following diseases and treatments were identified based on the user's symptoms:\n{}\n\n\
         Please generate a conversational response that summarizes this information and \
         emphasizes consulting a healthcare professional.",
        graph_summary(records)
    )
}

pub fn results_summary(results: &[CombinedResult]) -> String {
    results
        .iter()
        .map(|result| match result.source {
            ResultSource::Graph => format!(
                "- Source: {}\n  Disease: {}\n  Medicine: {}",
                result.source.label(),
                result.field("disease").unwrap_or(MISSING_TEXT),
                result.field("medicine").unwrap_or(MISSING_TEXT),
            ),
            _ => format!(
                "- Source: {}\n  Title: {}\n  Abstract: {}",
                result.source.label(),
                result.title().unwrap_or(MISSING_TEXT),
                excerpt(result.abstract_text().unwrap_or(MISSING_TEXT), EXCERPT_CHARS),
            ),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn combined_prompt(results: &[CombinedResult], symptoms: &[String]) -> String {
    format!(
        "The user reported the following symptoms: {}.\n\n\
         I found the following relevant information from various sources:\n{}\n\n\
         Based on the symptoms and information, generate a structured response in the following format:\n\
         1. **Possible Diseases**:\n\
         \x20  - Provide a list of possible diseases the user might have, with brief descriptions if available.\n\
         2. **Recommended Medications**:\n\
         \x20  - List over-the-counter or commonly prescribed medications that could help manage the symptoms. \
         Include a note to consult a doctor before use.\n\
         3. **Suggested Specialist**:\n\
         \x20  - Recommend the type of doctor the user should consult (e.g., general practitioner, neurologist).\n\n\
         The response should be conversational, empathetic, and helpful. Avoid chatbot-like language. \
         Ensure the output is concise, clear, and easy to read.",
        symptoms.join(", "),
        results_summary(results)
    )
}

pub fn conversational_prompt(message: &str) -> String {
    format!("The user said: '{}'. Generate a friendly response.", message)
}

/// Turns gathered evidence into the user-facing reply
pub struct ResponseComposer {
    llm: Arc<dyn LlmGenerationClient>,
}

impl ResponseComposer {
    pub fn new(llm: Arc<dyn LlmGenerationClient>) -> Self {
        Self { llm }
    }

    async fn generate_or_fallback(&self, prompt: String, kind: &'static str) -> String {
        match self.llm.generate(LlmGenerateRequest::new(prompt)).await {
            Ok(reply) => reply.text,
            Err(e) => {
                tracing::error!(error = %e, model = %self.llm.model(), "Error generating {} response", kind);
                GENERATION_FALLBACK.to_string()
            }
        }
    }

    pub async fn compose_graph_only(&self, records: &[GraphRecord]) -> String {
        self.generate_or_fallback(graph_only_prompt(records), "graph").await
    }

    pub async fn compose_combined(&self, results: &[CombinedResult], symptoms: &[String]) -> String {
        self.generate_or_fallback(combined_prompt(results, symptoms), "combined")
            .await
    }

    pub async fn compose_conversational(&self, message: &str) -> Result<String, LlmError> {
        let reply = self
            .llm
            .generate(LlmGenerateRequest::new(conversational_prompt(message)))
            .await?;
        Ok(reply.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medisense_models::{LiteratureItem, VectorHit};
    use serde_json::Map;

    #[test]
    fn test_excerpt_is_char_safe() {
        let text = "é".repeat(250);
        let cut = excerpt(&text, 200);
        assert_eq!(cut.chars().count(), 203);
        assert!(cut.ends_with("..."));

        assert_eq!(excerpt("short", 200), "short");
        assert_eq!(excerpt(&"a".repeat(200), 200), "a".repeat(200));
    }

    #[test]
    fn test_graph_summary_groups_and_dedups() {
        let records = vec![
            GraphRecord::new("Migraine", "Ibuprofen"),
            GraphRecord::new("Influenza", "Paracetamol"),
            GraphRecord::new("Migraine", "Aspirin"),
            GraphRecord::new("Migraine", "Ibuprofen"),
        ];
        assert_eq!(
            graph_summary(&records),
            "- Migraine: Ibuprofen, Aspirin\n- Influenza: Paracetamol"
        );
        assert!(graph_only_prompt(&records).contains("consulting a healthcare professional"));
    }

    #[test]
    fn test_results_summary_formats_each_source() {
        let hit = VectorHit::from_payload(7, 0.9, &Map::new());
        let item = LiteratureItem {
            id: 8,
            title: "aspirin trial".to_string(),
            abstract_text: "x".repeat(300),
            keywords: vec![],
        };
        let results = vec![
            CombinedResult::from_graph(&GraphRecord::new("Migraine", "Ibuprofen")),
            CombinedResult::from_hit(&hit),
            CombinedResult::from_literature(&item),
        ];

        let summary = results_summary(&results);
        assert!(summary.contains("- Source: Knowledge Graph\n  Disease: Migraine\n  Medicine: Ibuprofen"));
        assert!(summary.contains("- Source: Indexed Literature\n  Title: n/a\n  Abstract: n/a"));
        assert!(summary.contains(&format!("  Abstract: {}...", "x".repeat(200))));
        assert!(!summary.contains(&"x".repeat(201)));
    }

    #[test]
    fn test_combined_prompt_lists_symptoms_and_sections() {
        let prompt = combined_prompt(&[], &["fever".to_string(), "cough".to_string()]);
        assert!(prompt.starts_with("The user reported the following symptoms: fever, cough."));
        assert!(prompt.contains("1. **Possible Diseases**"));
        assert!(prompt.contains("2. **Recommended Medications**"));
        assert!(prompt.contains("3. **Suggested Specialist**"));
    }
}
