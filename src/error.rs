//! Common error types for the headshot workflow

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Banner text shown for any failed generation or edit call.
pub const GENERATION_FAILED_MESSAGE: &str = "Failed to generate image with the image service.";

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Could not create image preview.")]
    PreviewEncodingFailed,

    #[error("Unsupported image type: {0}. Upload a PNG, JPG, or WEBP file.")]
    UnsupportedMediaType(String),

    #[error("{0}")]
    Validation(String),

    #[error("Image generation request failed")]
    GenerationFailed,

    #[error("No image data found in the API response.")]
    NoImageReturned,

    #[error("API key is not configured; set API_KEY or HEADSHOT__GEMINI__API_KEY")]
    MissingCredential,

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    /// Message stored in the session banner. Generation failures are
    /// collapsed into one generic message; the cause only goes to the log.
    pub fn user_message(&self) -> String {
        match self {
            AppError::GenerationFailed | AppError::NoImageReturned => {
                GENERATION_FAILED_MESSAGE.to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Error response format
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub message: String,
    pub r#type: String,
    pub code: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, code) = match &self {
            AppError::PreviewEncodingFailed => (StatusCode::BAD_REQUEST, "invalid_request_error", Some("preview_encoding_failed")),
            AppError::UnsupportedMediaType(_) => (StatusCode::UNSUPPORTED_MEDIA_TYPE, "invalid_request_error", Some("unsupported_media_type")),
            AppError::Validation(_) => (StatusCode::CONFLICT, "invalid_request_error", Some("validation_error")),
            AppError::GenerationFailed => (StatusCode::BAD_GATEWAY, "backend_error", Some("generation_failed")),
            AppError::NoImageReturned => (StatusCode::BAD_GATEWAY, "backend_error", Some("no_image_returned")),
            AppError::MissingCredential => (StatusCode::INTERNAL_SERVER_ERROR, "server_error", Some("missing_credential")),
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "server_error", None),
            AppError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "server_error", None),
            AppError::Json(_) => (StatusCode::BAD_REQUEST, "invalid_request_error", Some("invalid_json")),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "server_error", None),
        };

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                message: self.user_message(),
                r#type: error_type.to_string(),
                code: code.map(|c| c.to_string()),
            },
        });

        (status, body).into_response()
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;
