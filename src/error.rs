//! Error types for the OCR server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::ocr::{EngineError, ImageDecodeError, ValidationError};

/// Message returned for any recognition failure
pub const EXTRACTION_FAILED_MESSAGE: &str = "Internal server error during text extraction";

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Endpoint not found")]
    NotFound,

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("File too large")]
    PayloadTooLarge,

    #[error("Text extraction failed: {0}")]
    Extraction(#[from] EngineError),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

/// The decoder detail stays server-side
impl From<ImageDecodeError> for AppError {
    fn from(_: ImageDecodeError) -> Self {
        AppError::BadRequest("Invalid image format".to_string())
    }
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    success: Option<bool>,
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    success: None,
                    error: message,
                },
            ),
            AppError::NotFound => (
                StatusCode::NOT_FOUND,
                ErrorResponse {
                    success: None,
                    error: "Endpoint not found".to_string(),
                },
            ),
            AppError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                ErrorResponse {
                    success: None,
                    error: "Method not allowed".to_string(),
                },
            ),
            AppError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                ErrorResponse {
                    success: None,
                    error: "File too large".to_string(),
                },
            ),
            AppError::Extraction(e) => {
                tracing::debug!("Hiding extraction error from client: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        success: Some(false),
                        error: EXTRACTION_FAILED_MESSAGE.to_string(),
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
