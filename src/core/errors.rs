use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use std::fmt;

pub const TOKEN_NOT_VALID: &str = "token_not_valid";

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized,
    TokenNotValid,
    NotFound(String),
    Conflict(String),
    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            ApiError::Unauthorized => write!(f, "Unauthorized"),
            ApiError::TokenNotValid => write!(f, "Given token not valid for any token type"),
            ApiError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal Error: {}", msg),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized | ApiError::TokenNotValid => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) | ApiError::Conflict(msg) => {
                serde_json::json!({"error": msg})
            }
            ApiError::Unauthorized => serde_json::json!({"error": "Unauthorized"}),
            ApiError::TokenNotValid => serde_json::json!({
                "error": self.to_string(),
                "code": TOKEN_NOT_VALID,
            }),
            // Internal details stay in the log.
            ApiError::InternalError(msg) => {
                tracing::error!(error = %msg, "request failed");
                serde_json::json!({"error": "Internal server error"})
            }
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}

impl std::error::Error for ApiError {}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}
