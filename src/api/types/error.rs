//! Structured `{error, message}` error responses

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::admission::DenialReason;
use crate::domain::analysis::PipelineError;
use crate::domain::document::ValidationError;
use crate::domain::DomainError;
use crate::infrastructure::services::UploadError;

/// Error payload: a stable machine-readable code and a human-readable message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
    pub message: String,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ApiErrorBody,
    retry_after_secs: Option<u64>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ApiErrorBody {
                error: code.into(),
                message: message.into(),
            },
            retry_after_secs: None,
        }
    }

    pub fn code(&self) -> &str {
        &self.body.error
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "FORBIDDEN", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn file_not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "FILE_NOT_FOUND", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE", message)
    }

    /// 429 carrying a `Retry-After` hint
    pub fn rate_limited(reason: &DenialReason) -> Self {
        let DenialReason::RateLimitExceeded {
            retry_after_secs, ..
        } = reason;

        Self {
            retry_after_secs: Some(*retry_after_secs),
            ..Self::new(
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                "Rate limit exceeded, try again in a bit.",
            )
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.body)).into_response();

        if let Some(secs) = self.retry_after_secs {
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match &err {
            DomainError::NotFound { message } => Self::not_found(message),
            DomainError::Validation { message } => Self::bad_request(message),
            DomainError::Configuration { message } => Self::internal(message),
            DomainError::Internal { message } => Self::internal(message),
            DomainError::Storage { message } => {
                tracing::error!(error = %message, "Storage failure");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR", "Database error")
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        let status = match err {
            ValidationError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        };

        Self::new(status, err.code(), err.to_string())
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Rejected(e) => e.into(),
            UploadError::Storage(e) => e.into(),
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::ClaimNotFound(_) => {
                Self::new(StatusCode::NOT_FOUND, err.code(), err.to_string())
            }
            PipelineError::DocumentMissing(_) => {
                Self::file_not_found("Document file not found for this claim.")
            }
            PipelineError::ExtractionFailed { .. } => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                err.code(),
                "OCR analysis failed. Please check the uploaded file format or contents.",
            ),
            PipelineError::Storage(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::claim::ClaimId;

    #[test]
    fn test_validation_errors_map_to_400() {
        let err: ApiError = ValidationError::unsupported("application/zip").into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "INVALID_FILE_TYPE");

        let err: ApiError = ValidationError::FileTooLarge {
            size: 10,
            limit: 5,
        }
        .into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "FILE_TOO_LARGE");
    }

    #[test]
    fn test_upload_io_failure_is_500() {
        let err: ApiError = ValidationError::Io(std::io::Error::other("disk")).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), "UPLOAD_FAILED");
    }

    #[test]
    fn test_pipeline_errors() {
        let err: ApiError = PipelineError::ClaimNotFound(ClaimId::new(4)).into();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.code(), "CLAIM_NOT_FOUND");
        assert_eq!(err.body.message, "No claim found with ID 4");

        let err: ApiError = PipelineError::DocumentMissing(ClaimId::new(4)).into();
        assert_eq!(err.code(), "FILE_NOT_FOUND");

        let err: ApiError = PipelineError::extraction("tesseract crashed").into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), "OCR_FAILED");
    }

    #[test]
    fn test_rate_limited_sets_retry_after() {
        let reason = DenialReason::RateLimitExceeded {
            limit: 30,
            window_secs: 60,
            retry_after_secs: 17,
        };

        let response = ApiError::rate_limited(&reason).into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "17");
    }

    #[test]
    fn test_domain_not_found() {
        let err: ApiError = DomainError::not_found("No claim found with ID 9").into();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
