//! Text generation clients used by the chat pipeline.

pub mod agents;
pub mod llm;

pub use agents::llm::gemini::GeminiClient;
pub use llm::{LlmError, LlmGenerateRequest, LlmGenerateResponse, LlmGenerationClient, OutputFormat};
