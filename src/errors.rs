// src/errors.rs
use actix_web::{HttpResponse, ResponseError};

/// Errors from the pure RN engine. The engine is total arithmetic apart
/// from the one precondition it enforces: percentage distances are
/// undefined for a non-positive reference price.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("invalid current price: {0} (must be positive)")]
    InvalidPrice(i64),
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Environment variable error: {0}")]
    EnvVarError(#[from] std::env::VarError),

    #[error("Reqwest error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("Data parsing error: {0}")]
    ParseError(String),

    #[error("Upstream API error: {0}")]
    UpstreamError(String),

    #[error(transparent)]
    EngineError(#[from] EngineError),

    #[error("Stock not found")]
    NotFound,

    #[error("Internal Server Error")]
    InternalError,
}

impl ResponseError for ServiceError {
    fn error_response(&self) -> HttpResponse {
        match self {
            ServiceError::NotFound => {
                HttpResponse::NotFound().json(serde_json::json!({
                    "error": "stock not found"
                }))
            }
            ServiceError::EnvVarError(_) => {
                log::error!("Configuration error: {}", self);
                HttpResponse::InternalServerError().body("Server configuration error")
            }
            ServiceError::ReqwestError(e) => {
                log::error!("HTTP client error: {}", e);
                HttpResponse::InternalServerError().body("Error communicating with upstream API")
            }
            ServiceError::ParseError(msg) => {
                log::error!("Data parsing error: {}", msg);
                HttpResponse::InternalServerError().body("Error processing upstream response")
            }
            ServiceError::UpstreamError(msg) => {
                log::error!("Upstream API error: {}", msg);
                HttpResponse::BadGateway().body("Upstream API request failed")
            }
            ServiceError::EngineError(e) => {
                log::error!("Engine error: {}", e);
                HttpResponse::UnprocessableEntity().body("Price data rejected by engine")
            }
            ServiceError::InternalError => HttpResponse::InternalServerError().finish(),
        }
    }
}
