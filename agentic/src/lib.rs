//! MediSense chat service: symptom extraction, evidence gathering from the
//! knowledge graph, the vector index and PubMed, and LLM reply composition.

pub mod bootstrap;
pub mod cli;
pub mod errors;
pub mod handlers;
pub mod services;

pub use errors::ChatError;
pub use services::{ChatOrchestrator, ChatReply, PipelineComponents, ReplyKind};

pub const SERVICE_NAME: &str = "medisense";
