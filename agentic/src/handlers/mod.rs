pub mod chat;
pub mod health;
pub mod index;

use actix_web::{error::JsonPayloadError, web, HttpRequest};

use crate::errors::ChatError;

pub use chat::chat;
pub use health::health;
pub use index::index;

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    tracing::warn!(error = %err, "Rejected chat request body");
    ChatError::InvalidBody(err.to_string()).into()
}

/// Register the chat routes and the JSON body policy
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .route("/", web::get().to(index))
        .route("/chat", web::post().to(chat))
        .route("/health", web::get().to(health));
}
