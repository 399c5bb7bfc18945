use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use medisense_llm::LlmError;
use medisense_models::ErrorResponse;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("No message provided")]
    EmptyMessage,

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Reply generation failed: {0}")]
    Generation(#[from] LlmError),
}

impl ChatError {
    /// Text shown to users; underlying causes only go to the logs
    pub fn public_message(&self) -> &'static str {
        match self {
            ChatError::EmptyMessage => "No message provided",
            ChatError::InvalidBody(_) => "Invalid request body",
            ChatError::Generation(_) => "Failed to process message",
        }
    }
}

impl ResponseError for ChatError {
    fn status_code(&self) -> StatusCode {
        match self {
            ChatError::EmptyMessage | ChatError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.public_message().to_string(),
        })
    }
}
