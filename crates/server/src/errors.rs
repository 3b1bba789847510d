use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use service::errors::ServiceError;
use service::validation::ValidationErrors;
use thiserror::Error;
use tracing::error;

/// Body of every error response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardError {
    pub timestamp: DateTime<Utc>,
    pub status: u16,
    pub error: String,
    pub message: String,
    pub path: String,
}

/// `StandardError` plus the ordered field violations.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationError {
    #[serde(flatten)]
    pub base: StandardError,
    pub errors: ValidationErrors,
}

/// A service failure bound to the request path that produced it.
#[derive(Debug)]
pub struct ApiError {
    pub error: ServiceError,
    pub path: String,
}

impl ApiError {
    pub fn new(error: ServiceError, path: impl Into<String>) -> Self { Self { error, path: path.into() } }

    pub fn status(&self) -> StatusCode {
        match &self.error {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::IntegrityConflict(_) | ServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::Db(_) | ServiceError::Hash(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn label(&self) -> &'static str {
        match &self.error {
            ServiceError::NotFound(_) => "Resource Not Found",
            ServiceError::IntegrityConflict(_) => "Database Exception",
            ServiceError::Validation(_) => "Validation Exception",
            ServiceError::Db(_) | ServiceError::Hash(_) => "Internal Server Error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self.error {
            ServiceError::NotFound(m) | ServiceError::IntegrityConflict(m) => m.clone(),
            ServiceError::Validation(_) => "Validation failed".to_string(),
            ServiceError::Db(_) | ServiceError::Hash(_) => {
                error!(error = %self.error, path = %self.path, "request failed");
                "Unexpected error".to_string()
            }
        };
        let base = StandardError {
            timestamp: Utc::now(),
            status: status.as_u16(),
            error: self.label().to_string(),
            message,
            path: self.path,
        };
        match self.error {
            ServiceError::Validation(errors) => (status, Json(ValidationError { base, errors })).into_response(),
            _ => (status, Json(base)).into_response(),
        }
    }
}

/// Attach the request path to a service result.
pub trait AtPath<T> {
    fn at(self, uri: &Uri) -> Result<T, ApiError>;
}

impl<T> AtPath<T> for Result<T, ServiceError> {
    fn at(self, uri: &Uri) -> Result<T, ApiError> { self.map_err(|e| ApiError::new(e, uri.path())) }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("database unavailable: {0}")]
    Database(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(err: ApiError) -> (StatusCode, serde_json::Value) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn not_found_payload() {
        let (status, body) = body_of(ApiError::new(ServiceError::not_found("Product", 1000), "/products/1000")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], 404);
        assert_eq!(body["error"], "Resource Not Found");
        assert_eq!(body["message"], "Product 1000 not found");
        assert_eq!(body["path"], "/products/1000");
        assert!(body["timestamp"].is_string());
        assert!(body.get("errors").is_none());
    }

    #[tokio::test]
    async fn validation_payload_lists_fields() {
        let mut errors = ValidationErrors::single("name", "Required field");
        errors.add("name", "Name must not be blank");
        let (status, body) = body_of(ApiError::new(ServiceError::Validation(errors), "/products")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "Validation Exception");
        assert_eq!(body["errors"].as_array().unwrap().len(), 2);
        assert_eq!(body["errors"][1]["fieldName"], "name");
    }

    #[tokio::test]
    async fn fatal_errors_hide_details() {
        let (status, body) = body_of(ApiError::new(ServiceError::Db("password=hunter2".into()), "/users")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal Server Error");
        assert!(!body.to_string().contains("hunter2"));
    }
}
