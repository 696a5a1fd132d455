use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::api::response::{ApiResponse, ErrorCode};

#[derive(Error, Debug)]
pub enum PageliftError {
    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Document open error: {0}")]
    DocumentOpen(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Orientation detection error: {0}")]
    OrientationDetection(String),

    #[error("OCR error: {0}")]
    Ocr(String),

    #[error("OCR unavailable: {0}")]
    OcrUnavailable(String),

    #[error("Report write error: {0}")]
    ReportWrite(String),

    #[error("Upload error: {0}")]
    Upload(String),

    #[error("Cleanup error: {0}")]
    Cleanup(String),

    #[error("Storage authentication error: {0}")]
    StorageAuth(String),

    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for PageliftError {
    fn into_response(self) -> Response {
        let response = match &self {
            PageliftError::InvalidEvent(_) => {
                ApiResponse::<()>::error(ErrorCode::InvalidRequest, self.to_string())
            }
            _ => {
                tracing::error!(error = %self, "Request failed");
                ApiResponse::<()>::error(ErrorCode::InternalError, "Internal server error")
            }
        };

        response.into_response()
    }
}

pub type Result<T> = std::result::Result<T, PageliftError>;
