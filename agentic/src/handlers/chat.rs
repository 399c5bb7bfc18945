use actix_web::{web, HttpRequest, HttpResponse};
use medisense_models::{ChatRequest, ChatResponse};
use medisense_observability::get_trace_context;
use std::sync::Arc;

use crate::errors::ChatError;
use crate::services::ChatOrchestrator;

pub async fn chat(
    req: HttpRequest,
    body: web::Json<ChatRequest>,
    orchestrator: web::Data<Arc<ChatOrchestrator>>,
) -> Result<HttpResponse, ChatError> {
    let trace = get_trace_context(&req);
    let message = body.message().ok_or(ChatError::EmptyMessage)?;

    tracing::info!(trace_id = %trace.trace_id, chars = message.chars().count(), "Chat message received");

    match orchestrator.handle_message(message).await {
        Ok(reply) => Ok(HttpResponse::Ok().json(ChatResponse { response: reply.text })),
        Err(e) => {
            tracing::error!(trace_id = %trace.trace_id, error = %e, "Error in chat route");
            Err(e)
        }
    }
}
