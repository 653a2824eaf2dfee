use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

use crate::pricing::ValidationError;
use crate::store::StoreError;

/// Application error types
#[derive(Debug)]
pub enum AppError {
    /// Authentication error
    Unauthorized(String),
    /// Malformed request body or parameter
    BadRequest(String),
    /// Move request failed validation
    Validation(ValidationError),
    /// Client exceeded its request budget
    RateLimited { retry_after_secs: u64 },
    /// Backing store failure that could not be recovered from
    Store(StoreError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            Self::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            Self::Validation(err) => write!(f, "Validation error: {}", err),
            Self::RateLimited { retry_after_secs } => {
                write!(f, "Rate limit exceeded, retry after {}s", retry_after_secs)
            }
            Self::Store(err) => write!(f, "Store error: {}", err),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            Self::RateLimited { .. } => (StatusCode::TOO_MANY_REQUESTS, self.to_string()),
            Self::Store(err) => (StatusCode::BAD_GATEWAY, err.to_string()),
        };

        let mut error = json!({
            "message": error_message,
            "type": error_type_name(&self),
        });
        if let Self::Validation(err) = &self {
            error["field"] = json!(err.field());
        }

        let mut response = (status, Json(json!({ "error": error }))).into_response();
        if let Self::RateLimited { retry_after_secs } = self {
            response.headers_mut().insert(
                axum::http::header::RETRY_AFTER,
                axum::http::HeaderValue::from(retry_after_secs),
            );
        }
        response
    }
}

fn error_type_name(error: &AppError) -> &'static str {
    match error {
        AppError::Unauthorized(_) => "unauthorized",
        AppError::BadRequest(_) => "bad_request",
        AppError::Validation(_) => "validation_error",
        AppError::RateLimited { .. } => "rate_limited",
        AppError::Store(_) => "store_error",
    }
}

// Implement conversions from common error types
impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}
