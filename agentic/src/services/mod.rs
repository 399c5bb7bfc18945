pub mod composer;
pub mod extractor;
pub mod orchestrator;

pub use composer::{ResponseComposer, GENERATION_FALLBACK, NO_INFORMATION};
pub use extractor::{KeywordExtractor, LlmExtractor, SymptomExtractor};
pub use orchestrator::{ChatOrchestrator, ChatReply, Evidence, PipelineComponents, ReplyKind};
