use actix_web::HttpResponse;
use medisense_models::HealthResponse;

use crate::SERVICE_NAME;

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
    })
}
